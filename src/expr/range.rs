use std::{cmp::Ordering, fmt};

use datafusion_common::ScalarValue;

use crate::{
    error::{FsqlError, Result},
    ord,
};

/// How the bounds of a [`ColumnRange`] are compared with partition values.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum RangeOrdering {
    /// The column's own ordering; strings compare lexicographically
    #[default]
    Natural,
    /// Values are compared as numbers, so `9 < 10` even for string columns
    Numeric,
    /// Any value satisfies the column and comparison moves on to the next one
    Wildcard,
}

/// One column of a lexicographic range, see [`Expr::LexRange`](super::Expr::LexRange).
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnRange {
    name: String,
    min: String,
    max: String,
    ordering: RangeOrdering,
}

impl ColumnRange {
    /// Fails with [`FsqlError::InvalidRange`] when `min > max`.
    pub fn new(
        name: impl Into<String>,
        min: impl Into<String>,
        max: impl Into<String>,
        ordering: RangeOrdering,
    ) -> Result<Self> {
        let range = Self {
            name: name.into(),
            min: min.into(),
            max: max.into(),
            ordering,
        };
        let valid = match ordering {
            RangeOrdering::Wildcard => true,
            RangeOrdering::Natural => match (parse_number(&range.min), parse_number(&range.max)) {
                (Some(min), Some(max)) => min <= max,
                _ => range.min <= range.max,
            },
            RangeOrdering::Numeric => matches!(
                (parse_number(&range.min), parse_number(&range.max)),
                (Some(min), Some(max)) if min <= max
            ),
        };
        if !valid {
            return Err(FsqlError::InvalidRange {
                reason: range.to_string(),
            });
        }
        Ok(range)
    }

    /// Lexicographic range `[min, max)`.
    pub fn natural(
        name: impl Into<String>,
        min: impl Into<String>,
        max: impl Into<String>,
    ) -> Result<Self> {
        Self::new(name, min, max, RangeOrdering::Natural)
    }

    pub fn numeric(name: impl Into<String>, min: i64, max: i64) -> Result<Self> {
        Self::new(name, min.to_string(), max.to_string(), RangeOrdering::Numeric)
    }

    pub fn wildcard(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min: String::new(),
            max: String::new(),
            ordering: RangeOrdering::Wildcard,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordering(&self) -> RangeOrdering {
        self.ordering
    }

    /// `(min vs value, value vs max)`; `None` when a side cannot be compared.
    pub(crate) fn compare(&self, value: &ScalarValue) -> Option<(Ordering, Ordering)> {
        match self.ordering {
            RangeOrdering::Wildcard => Some((Ordering::Equal, Ordering::Equal)),
            RangeOrdering::Numeric => {
                let value = Number::from_scalar(value)?;
                let min = parse_number(&self.min)?;
                let max = parse_number(&self.max)?;
                Some((min.partial_cmp(&value)?, value.partial_cmp(&max)?))
            }
            RangeOrdering::Natural => {
                let min = ord::compare_with_text(value, &self.min)?.reverse();
                let max = ord::compare_with_text(value, &self.max)?;
                Some((min, max))
            }
        }
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ordering {
            RangeOrdering::Wildcard => write!(f, "{} *", self.name),
            RangeOrdering::Natural => write!(f, "{} [{}, {})", self.name, self.min, self.max),
            RangeOrdering::Numeric => write!(f, "{} [{}, {}) numeric", self.name, self.min, self.max),
        }
    }
}

/// Integers compare exactly; only a float on either side falls back to `f64`.
#[derive(Clone, Copy, Debug)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        match ord::as_str(value) {
            Some(text) => parse_number(text),
            None => ord::scalar_as_i64(value)
                .map(Number::Int)
                .or_else(|| ord::scalar_as_f64(value).map(Number::Float)),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(left), Number::Int(right)) => Some(left.cmp(right)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

fn parse_number(raw: &str) -> Option<Number> {
    let raw = raw.trim();
    raw.parse()
        .map(Number::Int)
        .ok()
        .or_else(|| raw.parse().ok().map(Number::Float))
}
