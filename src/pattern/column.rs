use std::fmt;

use arrow_schema::DataType;
use chrono::NaiveDate;
use datafusion_common::ScalarValue;

use crate::error::{FsqlError, Result};

/// Path value Hive writes for a null partition.
pub const HIVE_NULL: &str = "__HIVE_DEFAULT_PARTITION__";

/// Logical type of a partition column.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ColumnType {
    #[default]
    Utf8,
    Int64,
    Float64,
    /// Calendar date, stored as Arrow `Date32`
    Date,
}

impl ColumnType {
    /// Resolve a type tag as written in a pattern (`name:int`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "str" | "string" | "utf8" => Some(ColumnType::Utf8),
            "int" | "i64" | "int64" | "long" => Some(ColumnType::Int64),
            "float" | "f64" | "float64" | "double" => Some(ColumnType::Float64),
            "date" => Some(ColumnType::Date),
            _ => None,
        }
    }

    pub fn data_type(self) -> DataType {
        match self {
            ColumnType::Utf8 => DataType::Utf8,
            ColumnType::Int64 => DataType::Int64,
            ColumnType::Float64 => DataType::Float64,
            ColumnType::Date => DataType::Date32,
        }
    }

    /// Parse raw path text into a typed scalar.
    ///
    /// [`HIVE_NULL`] maps to the null value of the type.
    pub fn parse_value(self, column: &str, raw: &str) -> Result<ScalarValue> {
        if raw == HIVE_NULL {
            return Ok(ScalarValue::try_from(&self.data_type())?);
        }
        let invalid = || FsqlError::InvalidPartitionValue {
            column: column.to_string(),
            raw: raw.to_string(),
            data_type: self.to_string(),
        };
        let value = match self {
            ColumnType::Utf8 => ScalarValue::Utf8(Some(raw.to_string())),
            ColumnType::Int64 => ScalarValue::Int64(Some(raw.parse().map_err(|_| invalid())?)),
            ColumnType::Float64 => {
                ScalarValue::Float64(Some(raw.parse().map_err(|_| invalid())?))
            }
            ColumnType::Date => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
                ScalarValue::Date32(Some(days_since_epoch(date)))
            }
        };
        Ok(value)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ColumnType::Utf8 => "str",
            ColumnType::Int64 => "int",
            ColumnType::Float64 => "float",
            ColumnType::Date => "date",
        };
        f.write_str(tag)
    }
}

/// A named, typed partition column.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: ColumnType,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    pub fn utf8(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Utf8)
    }
}

pub(crate) fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    date.signed_duration_since(epoch).num_days() as i32
}

pub(crate) fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(chrono::Duration::days(days as i64))
}

/// Render a scalar back into path text, the inverse of [`ColumnType::parse_value`].
pub(crate) fn render_value(value: &ScalarValue) -> Option<String> {
    if value.is_null() {
        return Some(HIVE_NULL.to_string());
    }
    match value {
        ScalarValue::Utf8(Some(v))
        | ScalarValue::LargeUtf8(Some(v))
        | ScalarValue::Utf8View(Some(v)) => Some(v.clone()),
        ScalarValue::Int8(Some(v)) => Some(v.to_string()),
        ScalarValue::Int16(Some(v)) => Some(v.to_string()),
        ScalarValue::Int32(Some(v)) => Some(v.to_string()),
        ScalarValue::Int64(Some(v)) => Some(v.to_string()),
        ScalarValue::UInt8(Some(v)) => Some(v.to_string()),
        ScalarValue::UInt16(Some(v)) => Some(v.to_string()),
        ScalarValue::UInt32(Some(v)) => Some(v.to_string()),
        ScalarValue::UInt64(Some(v)) => Some(v.to_string()),
        ScalarValue::Float64(Some(v)) => Some(v.to_string()),
        ScalarValue::Date32(Some(days)) => {
            date_from_days(*days).map(|d| d.format("%Y-%m-%d").to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_values() {
        assert_eq!(
            ColumnType::Int64.parse_value("c", "07").unwrap(),
            ScalarValue::Int64(Some(7))
        );
        assert_eq!(
            ColumnType::Utf8.parse_value("c", "07").unwrap(),
            ScalarValue::Utf8(Some("07".to_string()))
        );
        let date = ColumnType::Date.parse_value("d", "1970-01-02").unwrap();
        assert_eq!(date, ScalarValue::Date32(Some(1)));
    }

    #[test]
    fn hive_null_is_typed_null() {
        let value = ColumnType::Int64.parse_value("c", HIVE_NULL).unwrap();
        assert!(value.is_null());
        assert_eq!(value.data_type(), DataType::Int64);
    }

    #[test]
    fn rejects_unparseable_values() {
        let err = ColumnType::Int64.parse_value("year", "abc").unwrap_err();
        assert!(matches!(err, FsqlError::InvalidPartitionValue { .. }));
        assert!(err.to_string().contains("year"));
    }

    #[test]
    fn render_inverts_parse() {
        for (ty, raw) in [
            (ColumnType::Utf8, "x"),
            (ColumnType::Int64, "42"),
            (ColumnType::Date, "2022-04-30"),
        ] {
            let value = ty.parse_value("c", raw).unwrap();
            assert_eq!(render_value(&value).as_deref(), Some(raw));
        }
    }

    #[test]
    fn type_tags() {
        assert_eq!(ColumnType::from_tag("INT"), Some(ColumnType::Int64));
        assert_eq!(ColumnType::from_tag("date"), Some(ColumnType::Date));
        assert_eq!(ColumnType::from_tag("blob"), None);
    }
}
