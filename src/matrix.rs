// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Matrix Variables
//! A matrix variable is a named, immutable `rows x cols` grid of scalar
//! element symbols which are declared eagerly in the symbol registry.

use crate::expr::{Context, DeclareError, ExprRef, StringRef, SymbolKind};

/// Derived name of element `(row, col)` of the matrix `base`.
/// Indices are zero-based; the element `(0, 0)` of matrix `m` is `m(0, 0)`.
pub fn element_name(base: &str, row: usize, col: usize) -> String {
    format!("{base}({row}, {col})")
}

/// A named grid of matrix-element symbols, stored in row-major order.
/// The shape is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixVariable {
    name: StringRef,
    rows: usize,
    cols: usize,
    elements: Vec<ExprRef>,
}

impl Context {
    /// Declares a `rows x cols` matrix variable, registering one
    /// `MatrixElement` symbol per entry (see [`element_name`] for the naming
    /// scheme). Validation happens before any symbol is registered, so a
    /// failed declaration leaves the registry untouched.
    pub fn matrix_variable(
        &mut self,
        rows: usize,
        cols: usize,
        base_name: &str,
    ) -> Result<MatrixVariable, DeclareError> {
        if rows == 0 || cols == 0 {
            return Err(DeclareError::InvalidDimension { rows, cols });
        }
        if base_name.trim().is_empty() {
            return Err(DeclareError::InvalidName(base_name.to_string()));
        }
        let mut elements = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                // cannot fail: derived names of a valid base are valid
                let element = self.symbol(&element_name(base_name, row, col), SymbolKind::MatrixElement)?;
                elements.push(element);
            }
        }
        log::debug!("declared {rows}x{cols} matrix variable `{base_name}`");
        Ok(MatrixVariable {
            name: self.string(base_name),
            rows,
            cols,
            elements,
        })
    }
}

impl MatrixVariable {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Handle of the element symbol at `(row, col)`. Panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> ExprRef {
        assert!(
            row < self.rows && col < self.cols,
            "element ({row}, {col}) is out of bounds for a {}x{} matrix",
            self.rows,
            self.cols
        );
        self.elements[row * self.cols + col]
    }

    /// All element symbols in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ExprRef> + '_ {
        self.elements.iter().copied()
    }

    /// The base name the matrix was declared with.
    pub fn name<'ctx>(&self, ctx: &'ctx Context) -> &'ctx str {
        &ctx[self.name]
    }
}
