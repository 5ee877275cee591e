// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use symgraph::expr::*;

#[test]
fn test_base_cases() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();

    // d x / d x = 1
    assert_eq!(differentiate(&mut ctx, x, x).unwrap(), ctx.one());
    // d y / d x = 0
    assert_eq!(differentiate(&mut ctx, y, x).unwrap(), ctx.zero());
    // d c / d x = 0
    let c = ctx.constant(Scalar::new(7, 2));
    assert_eq!(differentiate(&mut ctx, c, x).unwrap(), ctx.zero());
}

#[test]
fn test_sum_rule() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();

    // d (x + y) / d x = 1
    let e = ctx.add(x, y);
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), ctx.one());

    // d (x + x) / d x = 2
    let e = ctx.add(x, x);
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), ctx.int(2));
}

#[test]
fn test_product_rule() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();
    let z = ctx.var("z").unwrap();

    // d (x * y) / d x = y
    let e = ctx.mul(x, y);
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), y);

    // d (x * y * z) / d x = y * z
    let e = ctx.mul_many([x, y, z]);
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), ctx.mul(y, z));
}

#[test]
fn test_power_rule() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();

    // d x^3 / d x = 3 * x^2
    let e = ctx.build(|b| b.pow(x, b.int(3)));
    let expected = ctx.build(|b| b.mul(b.int(3), b.pow(x, b.int(2))));
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), expected);
}

#[test]
fn test_general_power_rule() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();

    // d x^y / d x = x^y * y * (1 / x)
    let e = ctx.pow(x, y);
    let expected = ctx.build(|b| b.mul_many([b.pow(x, y), y, b.div(b.one(), x)]));
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), expected);
}

#[test]
fn test_quotient_rule() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();

    // d (x / y) / d x = y / y^2
    let e = ctx.div(x, y);
    let expected = ctx.build(|b| b.div(y, b.pow(y, b.int(2))));
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), expected);
}

#[test]
fn test_chain_rule() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();

    // d sin(x) / d x = cos(x)
    let e = ctx.apply(Function::Sin, x);
    let expected = ctx.apply(Function::Cos, x);
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), expected);

    // d sin(x^2) / d x = cos(x^2) * 2 * x
    let e = ctx.build(|b| b.apply(Function::Sin, b.pow(x, b.int(2))));
    let expected =
        ctx.build(|b| b.mul_many([b.apply(Function::Cos, b.pow(x, b.int(2))), b.int(2), x]));
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), expected);

    // d exp(x) / d x = exp(x)
    let e = ctx.apply(Function::Exp, x);
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), e);

    // d ln(x) / d x = 1 / x
    let e = ctx.apply(Function::Ln, x);
    let expected = ctx.build(|b| b.div(b.one(), x));
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), expected);
}

#[test]
fn test_neg_and_sub() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();

    // d (y - x) / d x = -1
    let e = ctx.sub(y, x);
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), ctx.int(-1));

    // d (-x) / d x = -1
    let e = ctx.neg(x);
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), ctx.int(-1));
}

#[test]
fn test_abs_and_sign() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();

    // d |x| / d x = sign(x)
    let e = ctx.apply(Function::Abs, x);
    let expected = ctx.apply(Function::Sign, x);
    assert_eq!(differentiate(&mut ctx, e, x).unwrap(), expected);

    // sign itself has no derivative rule: a recoverable error
    let e = ctx.apply(Function::Sign, x);
    assert_eq!(
        differentiate(&mut ctx, e, x),
        Err(DerivativeError::UnsupportedOperator("sign"))
    );
}

#[test]
fn test_shared_subexpressions() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let y = ctx.var("y").unwrap();

    // (x * y) + (x * y): the product is differentiated once, the sum rule doubles it
    let shared = ctx.mul(x, y);
    let e = ctx.add_many([shared, shared]);
    assert_eq!(
        differentiate(&mut ctx, e, x).unwrap(),
        ctx.add_many([y, y])
    );
}

#[test]
#[should_panic(expected = "with respect to a symbol")]
fn test_wrt_must_be_a_symbol() {
    let mut ctx = Context::default();
    let x = ctx.var("x").unwrap();
    let two = ctx.int(2);
    let e = ctx.mul(x, two);
    let _ = differentiate(&mut ctx, e, two);
}
