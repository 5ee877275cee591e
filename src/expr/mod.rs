// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

mod context;
mod derivative;
mod foreach;
mod meta;
mod nodes;
mod serialize;
mod simplify;
mod transform;
pub mod traversal;

pub use context::{Builder, Context, DeclareError, ExprRef, StringRef};
pub use derivative::{differentiate, DerivativeError};
pub use foreach::ForEachChild;
pub use meta::{
    get_fixed_point, DenseExprMetaData, DenseExprSet, ExprMap, ExprSet, SparseExprMap,
    SparseExprSet,
};
pub use nodes::{Args, Expr, Function, Scalar, SymbolKind};
pub use serialize::SerializableExpr;
pub use simplify::{simplify_single_expression, Simplifier};
pub use transform::substitute;
pub(crate) use transform::{do_transform_expr, ExprTransformMode};
