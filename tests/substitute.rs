// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use rustc_hash::FxHashMap;
use symgraph::expr::*;

#[test]
fn test_empty_mapping_is_identity() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();
    let e = ctx.build(|b| b.add(b.mul(x, y), b.int(1)));

    let simplified = simplify_single_expression(&mut ctx, e);
    let substituted = substitute(&mut ctx, simplified, &FxHashMap::default());
    assert_eq!(substituted, simplified);
}

#[test]
fn test_replace_symbol_with_expression() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();
    let z = ctx.var("z").unwrap();

    // x * x + y, with x := y + z
    let e = ctx.build(|b| b.add(b.mul(x, x), y));
    let replacement = ctx.add(y, z);
    let result = substitute(&mut ctx, e, &FxHashMap::from_iter([(x, replacement)]));

    let expected = ctx.build(|b| {
        let yz = b.add(y, z);
        b.add(b.mul(yz, yz), y)
    });
    assert_eq!(result, expected);
}

#[test]
fn test_multiple_replacements_in_one_pass() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();
    let a = ctx.var("a").unwrap();
    let b = ctx.var("b").unwrap();

    let e = ctx.sub(x, y);
    let replacements = FxHashMap::from_iter([(x, a), (y, b)]);
    assert_eq!(substitute(&mut ctx, e, &replacements), ctx.sub(a, b));
}

#[test]
fn test_untouched_subgraphs_keep_their_handles() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let a = ctx.var("a").unwrap();
    let b = ctx.var("b").unwrap();
    let c = ctx.var("c").unwrap();

    let left = ctx.mul(a, b);
    let e = ctx.build(|bld| bld.add(left, bld.mul(c, x)));

    let result = substitute(&mut ctx, e, &FxHashMap::from_iter([(x, a)]));
    // the subexpression without x is physically the same node
    match ctx.get(result).clone() {
        Expr::Add(args) => assert!(args.contains(&left)),
        other => panic!("expected a sum, got {other:?}"),
    }
}

#[test]
fn test_substitution_composes_with_simplify() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();

    // substituting x := 0 into x * y + y leaves 0 * y + y; simplification
    // collapses it to y
    let e = ctx.build(|b| b.add(b.mul(x, y), y));
    let zero = ctx.zero();
    let result = substitute(&mut ctx, e, &FxHashMap::from_iter([(x, zero)]));
    assert_eq!(simplify_single_expression(&mut ctx, result), y);
}

#[test]
fn test_replacement_only_hits_symbol_leaves() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();

    // a mapping keyed by a non-symbol node has no effect
    let product = ctx.mul(x, y);
    let e = ctx.add(product, x);
    let one = ctx.one();
    let result = substitute(&mut ctx, e, &FxHashMap::from_iter([(product, one)]));
    assert_eq!(result, e);
}

#[test]
fn test_chained_substitution_is_not_transitive() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();
    let z = ctx.var("z").unwrap();

    // x := y and y := z applied in one pass: the freshly inserted y is not
    // rewritten again
    let e = ctx.add(x, x);
    let replacements = FxHashMap::from_iter([(x, y), (y, z)]);
    let result = substitute(&mut ctx, e, &replacements);
    assert_eq!(result, ctx.add(y, y));
}
