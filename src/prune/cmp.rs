//! Comparison operator evaluation (=, !=, <, <=, >, >=)

use datafusion_common::ScalarValue;

use super::context::PartitionContext;
use crate::{
    expr::{CmpOp, TriState},
    ord,
};

pub(super) fn eval_cmp(
    column: &str,
    op: CmpOp,
    literal: &ScalarValue,
    ctx: &PartitionContext<'_>,
) -> TriState {
    match ctx.value(column) {
        Some(value) => eval_cmp_value(op, value, literal),
        None => TriState::Unknown,
    }
}

/// Null on either side, or a literal that cannot be coerced, is `Unknown`.
pub(super) fn eval_cmp_value(op: CmpOp, value: &ScalarValue, literal: &ScalarValue) -> TriState {
    match ord::compare(value, literal) {
        Some(ordering) => TriState::from(op.matches(ordering)),
        None => TriState::Unknown,
    }
}
