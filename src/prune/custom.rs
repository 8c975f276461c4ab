use super::context::PartitionContext;
use crate::expr::{CustomPredicate, TriState};

pub(super) fn eval_custom(custom: &CustomPredicate, ctx: &PartitionContext<'_>) -> TriState {
    let values: Option<Vec<_>> = custom
        .columns()
        .iter()
        .map(|column| ctx.value(column))
        .collect();
    match values {
        Some(values) => TriState::from(custom.call(&values)),
        None => TriState::Unknown,
    }
}
