//! Half-open date ranges and the calendar arithmetic behind year/month/day layouts.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{FsqlError, Result};

/// Parse `yyyy/mm/dd` or `yyyy-mm-dd`; month and day may omit the zero padding.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| FsqlError::InvalidDate {
            input: input.to_string(),
        })
}

/// A range of calendar days `[start, end)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(FsqlError::InvalidRange {
                reason: format!("date range starts at {start} after its end {end}"),
            });
        }
        Ok(Self { start, end })
    }

    /// Build a range from two date strings, see [`parse_date`].
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day past the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Last day inside the range, `None` when empty.
    pub(crate) fn last_day(&self) -> Option<NaiveDate> {
        if self.is_empty() {
            return None;
        }
        self.end.checked_sub_signed(Duration::days(1))
    }

    /// Values the given calendar field can take inside the range, narrowed by the
    /// already-bound parents (`year` for months, `year` and `month` for days).
    pub(crate) fn field_values(
        &self,
        field: DateField,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Vec<i64> {
        let Some(last) = self.last_day() else {
            return Vec::new();
        };
        let first = self.start;
        match (field, year, month) {
            (DateField::Year, _, _) => (first.year()..=last.year()).map(i64::from).collect(),
            (DateField::Month, Some(year), _) => {
                if year < first.year() || year > last.year() {
                    return Vec::new();
                }
                let lo = if year == first.year() { first.month() } else { 1 };
                let hi = if year == last.year() { last.month() } else { 12 };
                (lo..=hi).map(i64::from).collect()
            }
            (DateField::Day, Some(year), Some(month)) => {
                let Some(days) = days_in_month(year, month) else {
                    return Vec::new();
                };
                let key = (year, month);
                if key < (first.year(), first.month()) || key > (last.year(), last.month()) {
                    return Vec::new();
                }
                let lo = if key == (first.year(), first.month()) {
                    first.day()
                } else {
                    1
                };
                let hi = if key == (last.year(), last.month()) {
                    last.day()
                } else {
                    days
                };
                (lo..=hi).map(i64::from).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// `start..end`, both ends in a format accepted by [`parse_date`].
impl FromStr for DateRange {
    type Err = FsqlError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s.split_once("..").ok_or_else(|| FsqlError::InvalidDate {
            input: s.to_string(),
        })?;
        Self::parse(start, end)
    }
}

/// One level of a year/month/day layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DateField {
    Year,
    Month,
    Day,
}

pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}
