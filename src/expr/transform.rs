// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::expr::meta::get_fixed_point;
use crate::expr::*;
use rustc_hash::FxHashMap;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExprTransformMode {
    SingleStep,
    FixedPoint,
}

/// Rebuild-and-reintern transformation over an expression DAG.
///
/// Visits every reachable node exactly once (results are memoized in
/// `transformed`, keyed by node identity), bottom up: children first, then the
/// node itself with its transformed children. When `tran` declines to change a
/// node and none of its children changed, the original handle is reused
/// without any allocation. In fixed-point mode, rewritten nodes are visited
/// again until they map to themselves.
#[inline]
pub(crate) fn do_transform_expr<T: ExprMap<Option<ExprRef>>>(
    ctx: &mut Context,
    mode: ExprTransformMode,
    transformed: &mut T,
    mut todo: Vec<ExprRef>,
    mut tran: impl FnMut(&mut Context, ExprRef, &[ExprRef]) -> Option<ExprRef>,
) {
    let mut children = Vec::with_capacity(4);

    while let Some(expr_ref) = todo.pop() {
        // check to see if we processed all the children
        children.clear();
        let mut children_changed = false; // track whether any of the children changed
        let mut all_transformed = true; // tracks whether all children have been transformed or if there is more work to do
        ctx.get(expr_ref).for_each_child(|c| {
            let transformed_child = if mode == ExprTransformMode::FixedPoint {
                get_fixed_point(transformed, *c)
            } else {
                transformed[*c]
            };
            match transformed_child {
                Some(new_child_expr) => {
                    if new_child_expr != *c {
                        children_changed = true; // child changed
                    }
                    children.push(new_child_expr);
                }
                None => {
                    if all_transformed {
                        todo.push(expr_ref);
                    }
                    all_transformed = false;
                    todo.push(*c);
                }
            }
        });
        if !all_transformed {
            continue;
        }

        // call out to the transform
        let tran_res = tran(ctx, expr_ref, &children);
        let new_expr_ref = match tran_res {
            Some(e) => e,
            None => {
                if children_changed {
                    update_expr_children(ctx, expr_ref, &children)
                } else {
                    // if no children changed and the transform does not want to do changes,
                    // we can just keep the old expression
                    expr_ref
                }
            }
        };
        // remember the transformed version
        transformed[expr_ref] = Some(new_expr_ref);

        // in fixed point mode, we might not be done yet
        let is_at_fixed_point = expr_ref == new_expr_ref;
        if mode == ExprTransformMode::FixedPoint
            && !is_at_fixed_point
            && transformed[new_expr_ref].is_none()
        {
            // see if we can further rewrite the new expression
            todo.push(new_expr_ref);
        }
    }
}

/// Re-interns `expr_ref` with a new child list. Commutative operand lists are
/// re-canonicalized by the interner on the way in.
fn update_expr_children(ctx: &mut Context, expr_ref: ExprRef, children: &[ExprRef]) -> ExprRef {
    let new_expr = match (ctx.get(expr_ref).clone(), children) {
        (Expr::Symbol { .. }, _) => panic!("No children, should never get here."),
        (Expr::Constant(_), _) => panic!("No children, should never get here."),
        (Expr::Add(_), _) => Expr::Add(children.iter().copied().collect()),
        (Expr::Mul(_), _) => Expr::Mul(children.iter().copied().collect()),
        (Expr::Sub(_, _), [a, b]) => Expr::Sub(*a, *b),
        (Expr::Div(_, _), [a, b]) => Expr::Div(*a, *b),
        (Expr::Pow(_, _), [a, b]) => Expr::Pow(*a, *b),
        (Expr::Neg(_), [e]) => Expr::Neg(*e),
        (Expr::Apply(function, _), [e]) => Expr::Apply(function, *e),
        (other, _) => unreachable!("child count mismatch for expression `{other:?}`"),
    };
    ctx.add_expr(new_expr)
}

/// Replaces symbol leaves according to `replacements`, rebuilding and
/// re-interning every affected ancestor bottom up.
///
/// Keys of the mapping are symbol handles; values may be arbitrary expression
/// handles from the same context. A node reachable through multiple paths is
/// processed once, and any subgraph that contains no replaced symbol keeps its
/// original handle. Substituting with an empty mapping is the identity
/// operation.
pub fn substitute(
    ctx: &mut Context,
    root: ExprRef,
    replacements: &FxHashMap<ExprRef, ExprRef>,
) -> ExprRef {
    if replacements.is_empty() {
        return root;
    }
    let mut transformed = SparseExprMap::default();
    do_transform_expr(
        ctx,
        ExprTransformMode::SingleStep,
        &mut transformed,
        vec![root],
        |ctx, expr_ref, _children| {
            if ctx.get(expr_ref).is_symbol() {
                replacements.get(&expr_ref).copied()
            } else {
                None
            }
        },
    );
    transformed[root].unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_leaf() {
        let mut ctx = Context::default();
        let x = ctx.var("x").unwrap();
        let y = ctx.var("y").unwrap();
        let replacements = FxHashMap::from_iter([(x, y)]);
        assert_eq!(substitute(&mut ctx, x, &replacements), y);
    }

    #[test]
    fn test_substitute_rebuilds_ancestors_only() {
        let mut ctx = Context::default();
        let x = ctx.var("x").unwrap();
        let a = ctx.var("a").unwrap();
        let b = ctx.var("b").unwrap();
        let z = ctx.var("z").unwrap();

        let untouched = ctx.add(a, b);
        let e = ctx.mul(untouched, x);

        let replacements = FxHashMap::from_iter([(x, z)]);
        let result = substitute(&mut ctx, e, &replacements);
        assert_eq!(result, ctx.mul(untouched, z));
        // the subgraph without x keeps its identity
        match ctx.get(result) {
            Expr::Mul(args) => assert!(args.contains(&untouched)),
            other => panic!("expected a product, got {other:?}"),
        }
    }

    #[test]
    fn test_substitute_empty_is_identity() {
        let mut ctx = Context::default();
        let x = ctx.var("x").unwrap();
        let e = ctx.build(|b| b.add(x, b.int(1)));
        assert_eq!(substitute(&mut ctx, e, &FxHashMap::default()), e);
    }

    #[test]
    fn test_substitute_shared_subgraph() {
        let mut ctx = Context::default();
        let x = ctx.var("x").unwrap();
        let y = ctx.var("y").unwrap();
        let z = ctx.var("z").unwrap();

        // (x * y) + sin(x * y): the product is shared
        let shared = ctx.mul(x, y);
        let e = ctx.build(|b| b.add(shared, b.apply(Function::Sin, shared)));

        let replacements = FxHashMap::from_iter([(x, z)]);
        let result = substitute(&mut ctx, e, &replacements);
        let expected = ctx.build(|b| b.add(b.mul(z, y), b.apply(Function::Sin, b.mul(z, y))));
        assert_eq!(result, expected);
    }
}
