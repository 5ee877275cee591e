// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Expression Context
//! The [`Context`] owns all interned strings and expression nodes of one
//! session. Expressions are hash-consed: every node creation goes through the
//! interning table, so within one context structural equality of two
//! expressions is equivalent to equality of their [`ExprRef`] handles and the
//! expression graph is a DAG with physically shared subexpressions.

use crate::expr::nodes::{Args, Expr, Function, Scalar, SymbolKind};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::num::NonZeroU32;
use std::ops::Index;
use thiserror::Error;

/// Uniquely identifies an expression node in a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprRef(NonZeroU32);

impl ExprRef {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new(index as u32 + 1).unwrap())
    }

    pub(crate) fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Uniquely identifies an interned string in a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringRef(NonZeroU32);

impl StringRef {
    fn from_index(index: usize) -> Self {
        Self(NonZeroU32::new(index as u32 + 1).unwrap())
    }

    fn index(&self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Rejected symbol or matrix variable declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclareError {
    #[error("invalid symbol name `{0}`: names must contain at least one non-whitespace character")]
    InvalidName(String),
    #[error("invalid matrix shape {rows}x{cols}: rows and cols must both be at least 1")]
    InvalidDimension { rows: usize, cols: usize },
}

/// Symbol registry and expression interner of one session.
///
/// A context is an explicit value that is passed `&mut` into every
/// constructing call; immutable traversals only need `&Context`. The borrow
/// rules thus serialize all interning without any locking.
#[derive(Debug, Default, Clone)]
pub struct Context {
    strings: Vec<String>,
    string_lookup: FxHashMap<String, StringRef>,
    exprs: Vec<Expr>,
    expr_lookup: FxHashMap<Expr, ExprRef>,
}

impl Context {
    /// Looks up the node behind a handle.
    ///
    /// Panics if the handle does not belong to this context or was
    /// invalidated by [`Context::clear`].
    pub fn get(&self, reference: ExprRef) -> &Expr {
        match self.exprs.get(reference.index()) {
            Some(expr) => expr,
            None => panic!(
                "stale expression handle (index {}): the owning context was cleared or the handle belongs to a different context",
                reference.index()
            ),
        }
    }

    /// Number of interned expression nodes.
    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }

    /// Interns an expression node and returns its canonical handle.
    ///
    /// Commutative operators are canonicalized (operands sorted by interning
    /// rank) before the table lookup, so `a + b` and `b + a` produce the same
    /// handle. The structural hash only selects the bucket; the table always
    /// confirms a hit with full structural equality.
    pub(crate) fn add_expr(&mut self, expr: Expr) -> ExprRef {
        let expr = canonicalize(expr);
        if let Some(existing) = self.expr_lookup.get(&expr) {
            return *existing;
        }
        let reference = ExprRef::from_index(self.exprs.len());
        self.exprs.push(expr.clone());
        self.expr_lookup.insert(expr, reference);
        reference
    }

    pub(crate) fn string(&mut self, value: &str) -> StringRef {
        if let Some(existing) = self.string_lookup.get(value) {
            return *existing;
        }
        let reference = StringRef::from_index(self.strings.len());
        self.strings.push(value.to_string());
        self.string_lookup.insert(value.to_string(), reference);
        reference
    }

    /// Declares a symbol of the given kind.
    ///
    /// Declaring the same `(name, kind)` pair again returns the prior handle
    /// instead of allocating a duplicate; this idempotence is part of the
    /// registry contract. Names must contain at least one non-whitespace
    /// character.
    pub fn symbol(&mut self, name: &str, kind: SymbolKind) -> Result<ExprRef, DeclareError> {
        if name.trim().is_empty() {
            return Err(DeclareError::InvalidName(name.to_string()));
        }
        let name = self.string(name);
        Ok(self.add_expr(Expr::Symbol { name, kind }))
    }

    /// Declares a scalar variable. See [`Context::symbol`].
    pub fn var(&mut self, name: &str) -> Result<ExprRef, DeclareError> {
        self.symbol(name, SymbolKind::Scalar)
    }

    /// Resolves an already declared symbol without mutating the registry.
    pub fn lookup_symbol(&self, name: &str, kind: SymbolKind) -> Option<ExprRef> {
        let name = *self.string_lookup.get(name)?;
        self.expr_lookup.get(&Expr::Symbol { name, kind }).copied()
    }

    pub fn constant(&mut self, value: Scalar) -> ExprRef {
        self.add_expr(Expr::Constant(value))
    }

    pub fn int(&mut self, value: i64) -> ExprRef {
        self.constant(Scalar::from_integer(value))
    }

    pub fn zero(&mut self) -> ExprRef {
        self.int(0)
    }

    pub fn one(&mut self) -> ExprRef {
        self.int(1)
    }

    pub fn add(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::Add(Args::from_slice(&[a, b])))
    }

    /// Builds an n-ary sum. Zero operands yield the additive identity, a
    /// single operand is returned unchanged.
    pub fn add_many(&mut self, args: impl IntoIterator<Item = ExprRef>) -> ExprRef {
        let args: Args = args.into_iter().collect();
        match args.len() {
            0 => self.zero(),
            1 => args[0],
            _ => self.add_expr(Expr::Add(args)),
        }
    }

    pub fn mul(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::Mul(Args::from_slice(&[a, b])))
    }

    /// Builds an n-ary product. Zero operands yield the multiplicative
    /// identity, a single operand is returned unchanged.
    pub fn mul_many(&mut self, args: impl IntoIterator<Item = ExprRef>) -> ExprRef {
        let args: Args = args.into_iter().collect();
        match args.len() {
            0 => self.one(),
            1 => args[0],
            _ => self.add_expr(Expr::Mul(args)),
        }
    }

    pub fn sub(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::Sub(a, b))
    }

    pub fn div(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.add_expr(Expr::Div(a, b))
    }

    pub fn neg(&mut self, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::Neg(e))
    }

    pub fn pow(&mut self, base: ExprRef, exponent: ExprRef) -> ExprRef {
        self.add_expr(Expr::Pow(base, exponent))
    }

    pub fn apply(&mut self, function: Function, e: ExprRef) -> ExprRef {
        self.add_expr(Expr::Apply(function, e))
    }

    /// Composes a multi-node expression without threading `&mut self` through
    /// every intermediate call:
    ///
    /// ```ignore
    /// let e = ctx.build(|b| b.mul(b.int(2), b.pow(x, b.int(3))));
    /// ```
    pub fn build<F>(&mut self, f: F) -> ExprRef
    where
        F: FnOnce(&Builder) -> ExprRef,
    {
        let builder = Builder {
            ctx: RefCell::new(self),
        };
        f(&builder)
    }

    /// Discards every interned string and expression node.
    ///
    /// All outstanding [`ExprRef`] and [`StringRef`] handles become invalid;
    /// dereferencing one afterwards is a contract violation and panics.
    pub fn clear(&mut self) {
        self.strings.clear();
        self.string_lookup.clear();
        self.exprs.clear();
        self.expr_lookup.clear();
    }
}

impl Index<ExprRef> for Context {
    type Output = Expr;

    fn index(&self, reference: ExprRef) -> &Self::Output {
        self.get(reference)
    }
}

impl Index<StringRef> for Context {
    type Output = str;

    fn index(&self, reference: StringRef) -> &Self::Output {
        &self.strings[reference.index()]
    }
}

/// Sorts the operand list of commutative operators by interning rank.
fn canonicalize(mut expr: Expr) -> Expr {
    if let Expr::Add(args) | Expr::Mul(args) = &mut expr {
        args.sort_unstable();
    }
    expr
}

/// Shared-reference facade over a [`Context`] so that expression constructors
/// can be nested inside a single [`Context::build`] closure.
pub struct Builder<'a> {
    ctx: RefCell<&'a mut Context>,
}

impl Builder<'_> {
    pub fn constant(&self, value: Scalar) -> ExprRef {
        self.ctx.borrow_mut().constant(value)
    }

    pub fn int(&self, value: i64) -> ExprRef {
        self.ctx.borrow_mut().int(value)
    }

    pub fn zero(&self) -> ExprRef {
        self.ctx.borrow_mut().zero()
    }

    pub fn one(&self) -> ExprRef {
        self.ctx.borrow_mut().one()
    }

    pub fn add(&self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.ctx.borrow_mut().add(a, b)
    }

    pub fn add_many(&self, args: impl IntoIterator<Item = ExprRef>) -> ExprRef {
        self.ctx.borrow_mut().add_many(args)
    }

    pub fn mul(&self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.ctx.borrow_mut().mul(a, b)
    }

    pub fn mul_many(&self, args: impl IntoIterator<Item = ExprRef>) -> ExprRef {
        self.ctx.borrow_mut().mul_many(args)
    }

    pub fn sub(&self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.ctx.borrow_mut().sub(a, b)
    }

    pub fn div(&self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.ctx.borrow_mut().div(a, b)
    }

    pub fn neg(&self, e: ExprRef) -> ExprRef {
        self.ctx.borrow_mut().neg(e)
    }

    pub fn pow(&self, base: ExprRef, exponent: ExprRef) -> ExprRef {
        self.ctx.borrow_mut().pow(base, exponent)
    }

    pub fn apply(&self, function: Function, e: ExprRef) -> ExprRef {
        self.ctx.borrow_mut().apply(function, e)
    }
}
