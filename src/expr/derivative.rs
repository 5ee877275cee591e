// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Differentiation
//! Structural partial derivatives with one rule per operator. Results are
//! memoized per node identity, so shared subexpressions are differentiated
//! once, and the final expression is simplified before it is returned.

use super::{
    simplify_single_expression, Context, DenseExprMetaData, Expr, ExprMap, ExprRef, ForEachChild,
    Function, Scalar,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DerivativeError {
    #[error("no derivative rule for operator `{0}`")]
    UnsupportedOperator(&'static str),
}

/// Computes the partial derivative of `expr` with respect to `wrt`.
///
/// `wrt` must be a symbol handle; passing anything else is a contract
/// violation and panics. The only recoverable failure is an operator without
/// a derivative rule (`sign`, which is not differentiable at zero and
/// constant everywhere else).
pub fn differentiate(
    ctx: &mut Context,
    expr: ExprRef,
    wrt: ExprRef,
) -> Result<ExprRef, DerivativeError> {
    assert!(
        ctx.get(wrt).is_symbol(),
        "can only differentiate with respect to a symbol"
    );

    let mut derivatives: DenseExprMetaData<Option<ExprRef>> = DenseExprMetaData::default();
    let mut todo = vec![expr];
    let mut pending = Vec::with_capacity(4);

    while let Some(e) = todo.pop() {
        if derivatives[e].is_some() {
            continue;
        }
        // make sure all children have been differentiated first
        pending.clear();
        ctx.get(e).for_each_child(|c| {
            if derivatives[*c].is_none() {
                pending.push(*c);
            }
        });
        if !pending.is_empty() {
            todo.push(e);
            todo.append(&mut pending);
            continue;
        }
        let d = derive(ctx, e, wrt, &derivatives)?;
        derivatives[e] = Some(d);
    }

    let result = derivatives[expr].unwrap();
    Ok(simplify_single_expression(ctx, result))
}

/// Derivative of a single node, given the derivatives of all its children.
fn derive(
    ctx: &mut Context,
    e: ExprRef,
    wrt: ExprRef,
    derivatives: &impl ExprMap<Option<ExprRef>>,
) -> Result<ExprRef, DerivativeError> {
    let result = match ctx.get(e).clone() {
        Expr::Symbol { .. } => {
            if e == wrt {
                ctx.one()
            } else {
                ctx.zero()
            }
        }
        Expr::Constant(_) => ctx.zero(),
        Expr::Add(args) => {
            let terms: Vec<ExprRef> = args.iter().map(|a| derivatives[*a].unwrap()).collect();
            ctx.add_many(terms)
        }
        Expr::Mul(args) => {
            // n-ary Leibniz rule: sum over i of args[i]' * prod of the others
            let mut terms = Vec::with_capacity(args.len());
            for (i, arg) in args.iter().enumerate() {
                let mut factors: Vec<ExprRef> = vec![derivatives[*arg].unwrap()];
                factors.extend(
                    args.iter()
                        .enumerate()
                        .filter(|(j, _)| *j != i)
                        .map(|(_, other)| *other),
                );
                terms.push(ctx.mul_many(factors));
            }
            ctx.add_many(terms)
        }
        Expr::Sub(a, b) => {
            let (da, db) = (derivatives[a].unwrap(), derivatives[b].unwrap());
            ctx.sub(da, db)
        }
        Expr::Neg(a) => {
            let da = derivatives[a].unwrap();
            ctx.neg(da)
        }
        Expr::Div(a, b) => {
            // (u / v)' = (u' v - u v') / v^2
            let (da, db) = (derivatives[a].unwrap(), derivatives[b].unwrap());
            ctx.build(|c| c.div(c.sub(c.mul(da, b), c.mul(a, db)), c.pow(b, c.int(2))))
        }
        Expr::Pow(base, exponent) => {
            let (db, de) = (derivatives[base].unwrap(), derivatives[exponent].unwrap());
            match ctx.get(exponent).as_constant() {
                // n * u^(n-1) * u'
                Some(n) => ctx.build(|c| {
                    c.mul_many([
                        c.constant(n),
                        c.pow(base, c.constant(n - Scalar::from_integer(1))),
                        db,
                    ])
                }),
                // u^v * (v' ln u + v u' / u)
                None => ctx.build(|c| {
                    c.mul(
                        e,
                        c.add(
                            c.mul(de, c.apply(Function::Ln, base)),
                            c.mul(exponent, c.div(db, base)),
                        ),
                    )
                }),
            }
        }
        Expr::Apply(function, arg) => {
            let da = derivatives[arg].unwrap();
            let outer = match function {
                Function::Sin => ctx.build(|c| c.apply(Function::Cos, arg)),
                Function::Cos => ctx.build(|c| c.neg(c.apply(Function::Sin, arg))),
                Function::Tan => {
                    ctx.build(|c| c.div(c.one(), c.pow(c.apply(Function::Cos, arg), c.int(2))))
                }
                Function::Exp => e,
                Function::Ln => ctx.build(|c| c.div(c.one(), arg)),
                Function::Sqrt => {
                    ctx.build(|c| c.div(c.one(), c.mul(c.int(2), c.apply(Function::Sqrt, arg))))
                }
                Function::Abs => ctx.apply(Function::Sign, arg),
                Function::Sign => {
                    return Err(DerivativeError::UnsupportedOperator(Function::Sign.name()))
                }
            };
            ctx.mul(outer, da)
        }
    };
    Ok(result)
}
