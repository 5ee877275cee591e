// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use crate::expr::{ExprRef, StringRef};
use num_traits::{One, Zero};
use smallvec::SmallVec;

/// Exact rational value of a constant leaf.
pub type Scalar = num_rational::Rational64;

/// Operand list of an n-ary commutative operator.
/// Holds at least two entries, sorted by interning rank.
pub type Args = SmallVec<[ExprRef; 2]>;

/// Distinguishes stand-alone variables from the element symbols of a matrix
/// variable. Symbols are deduplicated per `(name, kind)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    Scalar,
    MatrixElement,
}

/// The closed set of unary functions that can appear in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Abs,
    Sign,
}

impl Function {
    pub fn name(&self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
            Function::Sign => "sign",
        }
    }
}

/// An immutable expression node. Nodes are owned by a [`crate::expr::Context`]
/// and refer to their children through [`ExprRef`] handles, never by value.
///
/// `Add` and `Mul` are n-ary and commutative; their operand lists are kept in
/// canonical (interning rank) order so that structurally equal sums and
/// products intern to the same node. All other operators preserve operand
/// order exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Symbol { name: StringRef, kind: SymbolKind },
    Constant(Scalar),
    Add(Args),
    Mul(Args),
    Sub(ExprRef, ExprRef),
    Div(ExprRef, ExprRef),
    Neg(ExprRef),
    Pow(ExprRef, ExprRef),
    Apply(Function, ExprRef),
}

impl Expr {
    pub fn is_symbol(&self) -> bool {
        matches!(self, Expr::Symbol { .. })
    }

    pub fn symbol_kind(&self) -> Option<SymbolKind> {
        match self {
            Expr::Symbol { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<Scalar> {
        match self {
            Expr::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Is this the constant zero (the additive identity)?
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Constant(value) if value.is_zero())
    }

    /// Is this the constant one (the multiplicative identity)?
    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Constant(value) if value.is_one())
    }
}
