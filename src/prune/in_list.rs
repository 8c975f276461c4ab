use datafusion_common::ScalarValue;

use super::{cmp, context::PartitionContext};
use crate::expr::{CmpOp, TriState};

pub(super) fn eval_in_list(
    column: &str,
    values: &[ScalarValue],
    ctx: &PartitionContext<'_>,
) -> TriState {
    let Some(bound) = ctx.value(column) else {
        return TriState::Unknown;
    };
    let mut all_false = true;
    for value in values {
        match cmp::eval_cmp_value(CmpOp::Eq, bound, value) {
            TriState::True => return TriState::True,
            TriState::Unknown => all_false = false,
            TriState::False => {}
        }
    }
    if all_false {
        TriState::False
    } else {
        TriState::Unknown
    }
}
