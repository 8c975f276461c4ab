//! Three-valued predicate evaluation over partition columns.
//!
//! A directory is kept while its partial assignment may still satisfy the
//! predicate ([`may_match`]); a file is accepted only when its full assignment
//! satisfies it ([`matches`]).

use crate::{
    expr::{Expr, TriState},
    partition::PartitionValue,
};

mod between;
mod cmp;
mod context;
mod custom;
mod date_range;
mod eval;
mod in_list;
mod is_null;
mod lex_range;
mod starts_with;

use context::PartitionContext;

/// Evaluate `expr` against the bound columns; unbound columns make leaves `Unknown`.
pub fn evaluate(expr: &Expr, columns: &[PartitionValue]) -> TriState {
    eval::eval_expr(expr, &PartitionContext::new(columns))
}

/// `false` only when no extension of `columns` can satisfy `expr`.
pub fn may_match(expr: &Expr, columns: &[PartitionValue]) -> bool {
    !evaluate(expr, columns).is_false()
}

/// `true` only when `columns` satisfy `expr` for certain.
pub fn matches(expr: &Expr, columns: &[PartitionValue]) -> bool {
    evaluate(expr, columns).is_true()
}
