// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! # Expression Traversals
//!
//! Contains functions to simplify non-recursive implementations of expression traversals.

use crate::expr::{Context, ExprRef, ExprSet, ForEachChild, SparseExprSet};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TraversalCmd {
    Stop,
    Continue,
}

/// Visits expressions from top to bottom. Halts exploration of a subgraph
/// when the visitor returns [`TraversalCmd::Stop`].
#[inline]
pub fn top_down(
    ctx: &Context,
    expr: ExprRef,
    mut f: impl FnMut(&Context, ExprRef) -> TraversalCmd,
) {
    let mut todo = vec![expr];
    while let Some(e) = todo.pop() {
        let do_continue = f(ctx, e) == TraversalCmd::Continue;
        if do_continue {
            ctx[e].for_each_child(|&c| todo.push(c));
        }
    }
}

/// Collects the distinct symbol leaves reachable from `expr`.
/// Shared subgraphs are visited only once.
pub fn symbols(ctx: &Context, expr: ExprRef) -> Vec<ExprRef> {
    let mut seen = SparseExprSet::default();
    let mut out = Vec::new();
    top_down(ctx, expr, |ctx, e| {
        if !seen.insert(e) {
            return TraversalCmd::Stop;
        }
        if ctx[e].is_symbol() {
            out.push(e);
        }
        TraversalCmd::Continue
    });
    out
}
