// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use crate::expr::{Expr, ExprRef};

pub trait ForEachChild<T: Clone> {
    fn for_each_child(&self, visitor: impl FnMut(&T));
    fn collect_children(&self, children: &mut Vec<T>) {
        self.for_each_child(|c: &T| {
            children.push(c.clone());
        });
    }

    fn num_children(&self) -> usize;
}

impl ForEachChild<ExprRef> for Expr {
    fn for_each_child(&self, mut visitor: impl FnMut(&ExprRef)) {
        match self {
            Expr::Symbol { .. } => {}   // no children
            Expr::Constant(_) => {}     // no children
            Expr::Add(args) | Expr::Mul(args) => {
                for arg in args.iter() {
                    (visitor)(arg);
                }
            }
            Expr::Sub(a, b) | Expr::Div(a, b) | Expr::Pow(a, b) => {
                (visitor)(a);
                (visitor)(b);
            }
            Expr::Neg(e) | Expr::Apply(_, e) => {
                (visitor)(e);
            }
        }
    }

    fn num_children(&self) -> usize {
        match self {
            Expr::Symbol { .. } => 0,
            Expr::Constant(_) => 0,
            Expr::Add(args) | Expr::Mul(args) => args.len(),
            Expr::Sub(_, _) | Expr::Div(_, _) | Expr::Pow(_, _) => 2,
            Expr::Neg(_) | Expr::Apply(_, _) => 1,
        }
    }
}
