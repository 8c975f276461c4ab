//! Expression evaluation against partially bound partition columns.
//!
//! # Architecture
//!
//! ```text
//! eval_expr (dispatcher)
//!     ├─> cmp::eval_cmp                (=, !=, <, >, ...)
//!     ├─> between::eval_between        (BETWEEN)
//!     ├─> in_list::eval_in_list        (IN)
//!     ├─> lex_range::eval_lex_range    (composite ranges)
//!     ├─> date_range::eval_date_range  (year/month/day ranges)
//!     └─> ...
//! ```

use super::{
    between, cmp, context::PartitionContext, custom, date_range, in_list, is_null, lex_range,
    starts_with,
};
use crate::expr::{Expr, TriState};

pub(super) fn eval_expr(expr: &Expr, ctx: &PartitionContext<'_>) -> TriState {
    match expr {
        Expr::True => TriState::True,
        Expr::False => TriState::False,
        Expr::Cmp { column, op, value } => cmp::eval_cmp(column, *op, value, ctx),
        Expr::Between {
            column,
            low,
            high,
            inclusive,
        } => between::eval_between(column, low, high, *inclusive, ctx),
        Expr::InList { column, values } => in_list::eval_in_list(column, values, ctx),
        Expr::StartsWith { column, prefix } => starts_with::eval_starts_with(column, prefix, ctx),
        Expr::IsNull { column, negated } => is_null::eval_is_null(column, *negated, ctx),
        Expr::LexRange(ranges) => lex_range::eval_lex_range(ranges, ctx),
        Expr::DateRange {
            range,
            year,
            month,
            day,
        } => {
            let columns = [year.as_str(), month.as_str(), day.as_str()];
            date_range::eval_date_range(range, columns, ctx)
        }
        Expr::Custom(predicate) => custom::eval_custom(predicate, ctx),
        Expr::And(parts) => {
            let mut result = TriState::True;
            for part in parts {
                result = result.and(eval_expr(part, ctx));
                if result == TriState::False {
                    break;
                }
            }
            result
        }
        Expr::Or(parts) => {
            let mut result = TriState::False;
            for part in parts {
                result = result.or(eval_expr(part, ctx));
                if result == TriState::True {
                    break;
                }
            }
            result
        }
        Expr::Not(inner) => eval_expr(inner, ctx).not(),
    }
}
