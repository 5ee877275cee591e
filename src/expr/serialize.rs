// Copyright 2023-2024 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::{Context, Expr, ExprRef};
use num_traits::Signed;
use std::io::Write;

/// Diagnostic rendering of expressions. Symbols render their declared name
/// verbatim; compound expressions use infix notation with parentheses where
/// precedence requires them.
pub trait SerializableExpr {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()>;
    fn serialize_to_str(&self, ctx: &Context) -> String {
        let mut buf = Vec::new();
        self.serialize(ctx, &mut buf)
            .expect("Failed to write to string!");
        String::from_utf8(buf).expect("Failed to read string we wrote!")
    }
}

impl SerializableExpr for ExprRef {
    fn serialize<W: Write>(&self, ctx: &Context, writer: &mut W) -> std::io::Result<()> {
        serialize_expr(ctx, *self, writer, 0)
    }
}

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_NEG: u8 = 3;
const PREC_POW: u8 = 4;
const PREC_ATOM: u8 = 5;

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Symbol { .. } => PREC_ATOM,
        // negative literals always get parenthesized when nested
        Expr::Constant(value) => {
            if value.is_negative() {
                0
            } else {
                PREC_ATOM
            }
        }
        Expr::Add(_) | Expr::Sub(_, _) => PREC_ADD,
        Expr::Mul(_) | Expr::Div(_, _) => PREC_MUL,
        Expr::Neg(_) => PREC_NEG,
        Expr::Pow(_, _) => PREC_POW,
        Expr::Apply(_, _) => PREC_ATOM,
    }
}

fn serialize_expr<W: Write>(
    ctx: &Context,
    e: ExprRef,
    writer: &mut W,
    parent_prec: u8,
) -> std::io::Result<()> {
    let expr = ctx.get(e);
    let prec = precedence(expr);
    let parens = prec < parent_prec;
    if parens {
        write!(writer, "(")?;
    }
    match expr {
        Expr::Symbol { name, .. } => write!(writer, "{}", &ctx[*name])?,
        Expr::Constant(value) => write!(writer, "{}", value)?,
        Expr::Add(args) => {
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(writer, " + ")?;
                }
                serialize_expr(ctx, *arg, writer, PREC_ADD)?;
            }
        }
        Expr::Mul(args) => {
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(writer, " * ")?;
                }
                serialize_expr(ctx, *arg, writer, PREC_MUL)?;
            }
        }
        Expr::Sub(a, b) => {
            serialize_expr(ctx, *a, writer, PREC_ADD)?;
            write!(writer, " - ")?;
            serialize_expr(ctx, *b, writer, PREC_ADD + 1)?;
        }
        Expr::Div(a, b) => {
            serialize_expr(ctx, *a, writer, PREC_MUL)?;
            write!(writer, " / ")?;
            serialize_expr(ctx, *b, writer, PREC_MUL + 1)?;
        }
        Expr::Neg(inner) => {
            write!(writer, "-")?;
            serialize_expr(ctx, *inner, writer, PREC_NEG)?;
        }
        Expr::Pow(base, exponent) => {
            serialize_expr(ctx, *base, writer, PREC_POW + 1)?;
            write!(writer, "^")?;
            serialize_expr(ctx, *exponent, writer, PREC_POW)?;
        }
        Expr::Apply(function, arg) => {
            write!(writer, "{}(", function.name())?;
            serialize_expr(ctx, *arg, writer, 0)?;
            write!(writer, ")")?;
        }
    }
    if parens {
        write!(writer, ")")?;
    }
    Ok(())
}
