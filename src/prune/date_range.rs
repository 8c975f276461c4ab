//! Dates assembled from year/month/day columns.
//!
//! With only a prefix of the three columns bound, the partition spans
//! `[earliest, latest]`; the result is `False` when that span misses the range,
//! `True` when the range covers it and `Unknown` otherwise.

use chrono::NaiveDate;

use super::context::PartitionContext;
use crate::{
    date::{DateRange, days_in_month},
    expr::TriState,
    ord::scalar_as_i64,
};

pub(super) fn eval_date_range(
    range: &DateRange,
    columns: [&str; 3],
    ctx: &PartitionContext<'_>,
) -> TriState {
    let [year, month, day] = columns.map(|name| ctx.value(name));
    let Some(year) = year else {
        return TriState::Unknown;
    };
    let Some(year) = scalar_as_i64(year).and_then(|y| i32::try_from(y).ok()) else {
        return TriState::Unknown;
    };
    let month = match month.map(scalar_as_i64) {
        None => None,
        Some(Some(month)) => match u32::try_from(month) {
            Ok(month) => Some(month),
            Err(_) => return TriState::False,
        },
        Some(None) => return TriState::Unknown,
    };
    let day = match day.map(scalar_as_i64) {
        None => None,
        Some(Some(day)) => match u32::try_from(day) {
            Ok(day) => Some(day),
            Err(_) => return TriState::False,
        },
        Some(None) => return TriState::Unknown,
    };

    let (month_l, month_r) = month.map_or((1, 12), |m| (m, m));
    let day_l = day.unwrap_or(1);
    let day_r = match day {
        Some(day) => Some(day),
        None => days_in_month(year, month_r),
    };
    let earliest = NaiveDate::from_ymd_opt(year, month_l, day_l);
    let latest = day_r.and_then(|d| NaiveDate::from_ymd_opt(year, month_r, d));
    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        // e.g. 2022/2/31, no date can live below this partition
        return TriState::False;
    };
    if earliest >= range.end() || latest < range.start() {
        TriState::False
    } else if earliest >= range.start() && latest < range.end() {
        TriState::True
    } else {
        TriState::Unknown
    }
}
