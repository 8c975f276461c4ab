use super::context::PartitionContext;
use crate::{expr::TriState, pattern::column::render_value};

/// Prefix test on the textual form of the bound value.
pub(super) fn eval_starts_with(column: &str, prefix: &str, ctx: &PartitionContext<'_>) -> TriState {
    let Some(value) = ctx.value(column) else {
        return TriState::Unknown;
    };
    if value.is_null() {
        return TriState::Unknown;
    }
    match render_value(value) {
        Some(text) => TriState::from(text.starts_with(prefix)),
        None => TriState::Unknown,
    }
}
