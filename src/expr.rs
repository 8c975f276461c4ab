use std::{
    fmt,
    ops::{BitAnd, BitOr, Not},
    sync::Arc,
};

use datafusion_common::ScalarValue;

use crate::date::DateRange;

mod range;
pub(crate) mod rewrite;

pub use range::{ColumnRange, RangeOrdering};
pub use rewrite::{candidate_values, simplify};

/// Kleene three-valued truth.
///
/// `Unknown` is produced whenever a predicate refers to a column that is not bound yet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TriState {
    True,
    False,
    Unknown,
}

impl TriState {
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (TriState::False, _) | (_, TriState::False) => TriState::False,
            (TriState::True, TriState::True) => TriState::True,
            _ => TriState::Unknown,
        }
    }

    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (TriState::True, _) | (_, TriState::True) => TriState::True,
            (TriState::False, TriState::False) => TriState::False,
            _ => TriState::Unknown,
        }
    }

    pub fn not(self) -> Self {
        match self {
            TriState::True => TriState::False,
            TriState::False => TriState::True,
            TriState::Unknown => TriState::Unknown,
        }
    }

    pub fn is_true(self) -> bool {
        self == TriState::True
    }

    pub fn is_false(self) -> bool {
        self == TriState::False
    }
}

impl From<bool> for TriState {
    fn from(value: bool) -> Self {
        if value {
            TriState::True
        } else {
            TriState::False
        }
    }
}

impl BitAnd for TriState {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for TriState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl Not for TriState {
    type Output = Self;

    fn not(self) -> Self::Output {
        TriState::not(self)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    pub(crate) fn matches(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            CmpOp::Eq => ordering == Equal,
            CmpOp::NotEq => ordering != Equal,
            CmpOp::Lt => ordering == Less,
            CmpOp::LtEq => ordering != Greater,
            CmpOp::Gt => ordering == Greater,
            CmpOp::GtEq => ordering != Less,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
        }
    }
}

type CustomFn = dyn Fn(&[&ScalarValue]) -> bool + Send + Sync;

/// A user-supplied test over a fixed set of columns.
///
/// The closure sees the values of `columns` in declaration order and only runs once
/// all of them are bound; before that the predicate is `Unknown`.
#[derive(Clone)]
pub struct CustomPredicate {
    columns: Vec<String>,
    f: Arc<CustomFn>,
}

impl CustomPredicate {
    pub fn new<I, S, F>(columns: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[&ScalarValue]) -> bool + Send + Sync + 'static,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            f: Arc::new(f),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub(crate) fn call(&self, values: &[&ScalarValue]) -> bool {
        (self.f)(values)
    }
}

impl fmt::Debug for CustomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CustomPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns && Arc::ptr_eq(&self.f, &other.f)
    }
}

/// Predicate over partition columns.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Expr {
    True,
    False,
    Cmp {
        column: String,
        op: CmpOp,
        value: ScalarValue,
    },
    Between {
        column: String,
        low: ScalarValue,
        high: ScalarValue,
        inclusive: bool,
    },
    InList {
        column: String,
        values: Vec<ScalarValue>,
    },
    StartsWith {
        column: String,
        prefix: String,
    },
    IsNull {
        column: String,
        negated: bool,
    },
    /// Composite `>= (min1, min2, ..)` and `< (max1, max2, ..)` over the listed columns
    LexRange(Vec<ColumnRange>),
    /// Dates assembled from three columns, within `range`
    DateRange {
        range: DateRange,
        year: String,
        month: String,
        day: String,
    },
    Custom(CustomPredicate),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    /// Build a comparison expression with an explicit operator.
    pub fn cmp(column: impl Into<String>, op: CmpOp, value: impl Into<ScalarValue>) -> Self {
        Expr::Cmp {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Build an equality expression (`=`).
    pub fn eq(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, CmpOp::Eq, value)
    }

    /// Build a not-equal expression (`!=`).
    pub fn not_eq(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, CmpOp::NotEq, value)
    }

    /// Build a less-than expression (`<`).
    pub fn lt(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, CmpOp::Lt, value)
    }

    /// Build a less-than-or-equal expression (`<=`).
    pub fn lt_eq(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, CmpOp::LtEq, value)
    }

    /// Build a greater-than expression (`>`).
    pub fn gt(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, CmpOp::Gt, value)
    }

    /// Build a greater-than-or-equal expression (`>=`).
    pub fn gt_eq(column: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::cmp(column, CmpOp::GtEq, value)
    }

    /// Build a BETWEEN expression.
    pub fn between(
        column: impl Into<String>,
        low: impl Into<ScalarValue>,
        high: impl Into<ScalarValue>,
        inclusive: bool,
    ) -> Self {
        Expr::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            inclusive,
        }
    }

    /// Build an IN (...) expression.
    pub fn in_list<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ScalarValue>,
    {
        Expr::InList {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a prefix match expression (`LIKE 'prefix%'`).
    pub fn starts_with(column: impl Into<String>, prefix: impl Into<String>) -> Self {
        Expr::StartsWith {
            column: column.into(),
            prefix: prefix.into(),
        }
    }

    /// Build an IS NULL expression.
    pub fn is_null(column: impl Into<String>) -> Self {
        Expr::IsNull {
            column: column.into(),
            negated: false,
        }
    }

    /// Build an IS NOT NULL expression.
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Expr::IsNull {
            column: column.into(),
            negated: true,
        }
    }

    pub fn lex_range(ranges: Vec<ColumnRange>) -> Self {
        Expr::LexRange(ranges)
    }

    /// Dates in `range`, read from the `year`, `month` and `day` columns.
    pub fn date_range(range: DateRange) -> Self {
        Self::date_range_on(range, "year", "month", "day")
    }

    pub fn date_range_on(
        range: DateRange,
        year: impl Into<String>,
        month: impl Into<String>,
        day: impl Into<String>,
    ) -> Self {
        Expr::DateRange {
            range,
            year: year.into(),
            month: month.into(),
            day: day.into(),
        }
    }

    pub fn custom<I, S, F>(columns: I, f: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[&ScalarValue]) -> bool + Send + Sync + 'static,
    {
        Expr::Custom(CustomPredicate::new(columns, f))
    }

    /// Build an AND expression.
    pub fn and(parts: Vec<Expr>) -> Self {
        Expr::And(parts)
    }

    /// Build an OR expression.
    pub fn or(parts: Vec<Expr>) -> Self {
        Expr::Or(parts)
    }

    /// Build a NOT expression.
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Expr], sep: &str, empty: &str) -> fmt::Result {
    match parts {
        [] => write!(f, "{empty}"),
        [single] => write!(f, "{single}"),
        _ => {
            write!(f, "(")?;
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    write!(f, " {sep} ")?;
                }
                write!(f, "{part}")?;
            }
            write!(f, ")")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::True => write!(f, "TRUE"),
            Expr::False => write!(f, "FALSE"),
            Expr::Cmp { column, op, value } => {
                write!(f, "{} {} {:?}", column, op.symbol(), value)
            }
            Expr::Between {
                column,
                low,
                high,
                inclusive,
            } => {
                if *inclusive {
                    write!(f, "{} BETWEEN {:?} AND {:?}", column, low, high)
                } else {
                    write!(f, "{} > {:?} AND {} < {:?}", column, low, column, high)
                }
            }
            Expr::InList { column, values } => {
                write!(f, "{} IN (", column)?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", v)?;
                }
                write!(f, ")")
            }
            Expr::StartsWith { column, prefix } => {
                write!(f, "{} LIKE '{}%'", column, prefix)
            }
            Expr::IsNull { column, negated } => {
                if *negated {
                    write!(f, "{} IS NOT NULL", column)
                } else {
                    write!(f, "{} IS NULL", column)
                }
            }
            Expr::LexRange(ranges) => {
                write!(f, "LEX_RANGE(")?;
                for (i, range) in ranges.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{range}")?;
                }
                write!(f, ")")
            }
            Expr::DateRange {
                range,
                year,
                month,
                day,
            } => write!(f, "DATE({year}, {month}, {day}) IN {range}"),
            Expr::Custom(custom) => write!(f, "CUSTOM({})", custom.columns.join(", ")),
            Expr::And(parts) => write_joined(f, parts, "AND", "TRUE"),
            Expr::Or(parts) => write_joined(f, parts, "OR", "FALSE"),
            Expr::Not(inner) => write!(f, "NOT ({})", inner),
        }
    }
}
