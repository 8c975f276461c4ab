use super::context::PartitionContext;
use crate::expr::TriState;

pub(super) fn eval_is_null(column: &str, negated: bool, ctx: &PartitionContext<'_>) -> TriState {
    match ctx.value(column) {
        Some(value) => TriState::from(value.is_null() != negated),
        None => TriState::Unknown,
    }
}
