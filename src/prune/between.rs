use datafusion_common::ScalarValue;

use super::{cmp, context::PartitionContext};
use crate::expr::{CmpOp, TriState};

pub(super) fn eval_between(
    column: &str,
    low: &ScalarValue,
    high: &ScalarValue,
    inclusive: bool,
    ctx: &PartitionContext<'_>,
) -> TriState {
    let op_low = if inclusive { CmpOp::GtEq } else { CmpOp::Gt };
    let op_high = if inclusive { CmpOp::LtEq } else { CmpOp::Lt };
    let low_eval = cmp::eval_cmp(column, op_low, low, ctx);
    let high_eval = cmp::eval_cmp(column, op_high, high, ctx);
    low_eval.and(high_eval)
}
