// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{
    do_transform_expr, get_fixed_point, Context, Expr, ExprMap, ExprRef, ExprTransformMode,
    Function, Scalar, SparseExprMap,
};
use num_traits::{One, Signed, Zero};

/// Number of rewrites after which a simplification run gives up and returns
/// its best-effort result.
const DEFAULT_STEP_LIMIT: usize = 10_000;

/// Applies simplifications to a single expression.
pub fn simplify_single_expression(ctx: &mut Context, expr: ExprRef) -> ExprRef {
    let mut simplifier = Simplifier::new(SparseExprMap::default());
    simplifier.simplify(ctx, expr)
}

/// Performs simplification and canonicalization on expressions and caches the results.
///
/// Rules are applied bottom up until a fixed point is reached or the step
/// limit is exhausted; hitting the limit yields the best-effort result, never
/// an error. The same simplifier can be reused across expressions of one
/// context, its cache stays valid because interned nodes are immutable.
///
/// Simplification is idempotent: a fully simplified expression maps to itself.
pub struct Simplifier<T: ExprMap<Option<ExprRef>>> {
    cache: T,
    step_limit: usize,
}

impl<T: ExprMap<Option<ExprRef>>> Simplifier<T> {
    pub fn new(cache: T) -> Self {
        Self {
            cache,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    pub fn with_step_limit(cache: T, step_limit: usize) -> Self {
        Self { cache, step_limit }
    }

    pub fn simplify(&mut self, ctx: &mut Context, e: ExprRef) -> ExprRef {
        let mut budget = self.step_limit;
        do_transform_expr(
            ctx,
            ExprTransformMode::FixedPoint,
            &mut self.cache,
            vec![e],
            |ctx, expr, children| {
                if budget == 0 {
                    return None;
                }
                let result = simplify(ctx, expr, children);
                if result.is_some() {
                    budget -= 1;
                }
                result
            },
        );
        if budget == 0 {
            log::debug!(
                "simplification stopped after {} rewrites, returning best-effort result",
                self.step_limit
            );
        }
        get_fixed_point(&mut self.cache, e).unwrap()
    }
}

/// Simplifies one expression (not its children).
/// `children` holds the already simplified child handles.
pub(crate) fn simplify(ctx: &mut Context, expr: ExprRef, children: &[ExprRef]) -> Option<ExprRef> {
    match (ctx.get(expr).clone(), children) {
        (Expr::Add(_), args) => simplify_add(ctx, args),
        (Expr::Mul(_), args) => simplify_mul(ctx, args),
        (Expr::Sub(_, _), [a, b]) => simplify_sub(ctx, *a, *b),
        (Expr::Div(_, _), [a, b]) => simplify_div(ctx, *a, *b),
        (Expr::Neg(_), [e]) => simplify_neg(ctx, *e),
        (Expr::Pow(_, _), [a, b]) => simplify_pow(ctx, *a, *b),
        (Expr::Apply(function, _), [e]) => simplify_apply(ctx, function, *e),
        _ => None,
    }
}

/// Splits the operands of an n-ary commutative operator into the non-constant
/// terms and the folded constant, flattening nested operators of the same
/// kind along the way.
struct FoldedArgs {
    terms: Vec<ExprRef>,
    constant: Scalar,
    num_constants: usize,
    flattened: bool,
}

fn fold_commutative(
    ctx: &Context,
    args: &[ExprRef],
    is_add: bool,
    mut constant: Scalar,
) -> FoldedArgs {
    let mut queue: Vec<ExprRef> = args.to_vec();
    let mut terms = Vec::with_capacity(args.len());
    let mut num_constants = 0;
    let mut flattened = false;
    let mut i = 0;
    while i < queue.len() {
        let arg = queue[i];
        i += 1;
        match ctx.get(arg) {
            Expr::Constant(value) => {
                if is_add {
                    constant += *value;
                } else {
                    constant *= *value;
                }
                num_constants += 1;
            }
            Expr::Add(inner) if is_add => {
                queue.extend(inner.iter().copied());
                flattened = true;
            }
            Expr::Mul(inner) if !is_add => {
                queue.extend(inner.iter().copied());
                flattened = true;
            }
            _ => terms.push(arg),
        }
    }
    FoldedArgs {
        terms,
        constant,
        num_constants,
        flattened,
    }
}

fn simplify_add(ctx: &mut Context, args: &[ExprRef]) -> Option<ExprRef> {
    let mut folded = fold_commutative(ctx, args, true, Scalar::zero());
    // constants changed the sum if more than one was merged, or if a lone
    // constant turned out to be the additive identity
    let fold_changed =
        folded.num_constants > 1 || (folded.num_constants == 1 && folded.constant.is_zero());
    if !folded.flattened && !fold_changed {
        return None;
    }
    if !folded.constant.is_zero() || folded.terms.is_empty() {
        let c = ctx.constant(folded.constant);
        folded.terms.push(c);
    }
    Some(ctx.add_many(folded.terms))
}

fn simplify_mul(ctx: &mut Context, args: &[ExprRef]) -> Option<ExprRef> {
    let mut folded = fold_commutative(ctx, args, false, Scalar::one());
    if folded.constant.is_zero() {
        // x * 0 -> 0
        return Some(ctx.zero());
    }
    let fold_changed =
        folded.num_constants > 1 || (folded.num_constants == 1 && folded.constant.is_one());
    if !folded.flattened && !fold_changed {
        return None;
    }
    if !folded.constant.is_one() || folded.terms.is_empty() {
        let c = ctx.constant(folded.constant);
        folded.terms.push(c);
    }
    Some(ctx.mul_many(folded.terms))
}

fn simplify_sub(ctx: &mut Context, a: ExprRef, b: ExprRef) -> Option<ExprRef> {
    // x - x -> 0
    if a == b {
        return Some(ctx.zero());
    }
    // x - 0 -> x
    if ctx.get(b).is_zero() {
        return Some(a);
    }
    // 0 - x -> -x
    if ctx.get(a).is_zero() {
        return Some(ctx.neg(b));
    }
    match (ctx.get(a).as_constant(), ctx.get(b).as_constant()) {
        (Some(x), Some(y)) => Some(ctx.constant(x - y)),
        _ => None,
    }
}

fn simplify_div(ctx: &mut Context, a: ExprRef, b: ExprRef) -> Option<ExprRef> {
    // division by zero is left in place for the caller to deal with
    if ctx.get(b).is_zero() {
        return None;
    }
    // x / 1 -> x
    if ctx.get(b).is_one() {
        return Some(a);
    }
    // 0 / x -> 0
    if ctx.get(a).is_zero() {
        return Some(ctx.zero());
    }
    match (ctx.get(a).as_constant(), ctx.get(b).as_constant()) {
        (Some(x), Some(y)) => Some(ctx.constant(x / y)),
        _ => None,
    }
}

fn simplify_neg(ctx: &mut Context, e: ExprRef) -> Option<ExprRef> {
    match ctx.get(e).clone() {
        Expr::Neg(inner) => Some(inner), // double negation
        Expr::Constant(value) => Some(ctx.constant(-value)),
        _ => None,
    }
}

fn simplify_pow(ctx: &mut Context, base: ExprRef, exponent: ExprRef) -> Option<ExprRef> {
    // x^0 -> 1 and x^1 -> x
    if ctx.get(exponent).is_zero() {
        return Some(ctx.one());
    }
    if ctx.get(exponent).is_one() {
        return Some(base);
    }
    // 1^x -> 1
    if ctx.get(base).is_one() {
        return Some(ctx.one());
    }
    match (ctx.get(base).as_constant(), ctx.get(exponent).as_constant()) {
        (Some(b), Some(e)) => pow_scalar(b, e).map(|value| ctx.constant(value)),
        _ => None,
    }
}

/// Folds `base^exponent` for integer exponents of small magnitude. Larger
/// exponents (and `0^negative`) keep the symbolic node.
fn pow_scalar(base: Scalar, exponent: Scalar) -> Option<Scalar> {
    if !exponent.is_integer() {
        return None;
    }
    let e = exponent.to_integer();
    if base.is_zero() {
        // 0^negative stays symbolic, 0^positive is zero at any magnitude
        return if e > 0 { Some(Scalar::zero()) } else { None };
    }
    if e.unsigned_abs() > 32 {
        return None;
    }
    let mut result = Scalar::one();
    for _ in 0..e.unsigned_abs() {
        result *= base;
    }
    if e < 0 {
        result = result.recip();
    }
    Some(result)
}

fn simplify_apply(ctx: &mut Context, function: Function, e: ExprRef) -> Option<ExprRef> {
    let value = ctx.get(e).as_constant()?;
    let folded = match function {
        Function::Sin | Function::Tan if value.is_zero() => Scalar::zero(),
        Function::Cos | Function::Exp if value.is_zero() => Scalar::one(),
        Function::Ln if value.is_one() => Scalar::zero(),
        Function::Sqrt if value.is_zero() || value.is_one() => value,
        Function::Abs => value.abs(),
        Function::Sign => Scalar::from_integer(value.numer().signum()),
        _ => return None,
    };
    Some(ctx.constant(folded))
}
