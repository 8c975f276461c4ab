//! Ordering between partition values and predicate literals of possibly different types.

use std::cmp::Ordering;

use arrow_schema::DataType;
use datafusion_common::ScalarValue;

/// Compare a bound partition value with a literal.
///
/// The literal is coerced to the column's type. An untyped (`Utf8`) column compared
/// with a numeric or date literal is parsed as that literal's type instead. Integers
/// meeting floats compare as `Float64` on both sides, so a literal is never truncated.
/// Nulls and failed coercions yield `None`.
pub(crate) fn compare(value: &ScalarValue, literal: &ScalarValue) -> Option<Ordering> {
    if value.is_null() || literal.is_null() {
        return None;
    }
    let value_type = value.data_type();
    let literal_type = literal.data_type();
    if value_type == literal_type {
        return value.partial_cmp(literal);
    }
    if is_mixed_numeric(&value_type, &literal_type) {
        let value = value.cast_to(&DataType::Float64).ok()?;
        let literal = literal.cast_to(&DataType::Float64).ok()?;
        return value.partial_cmp(&literal);
    }
    if is_string(&value_type) && !is_string(&literal_type) {
        let text = as_str(value)?;
        let parsed = ScalarValue::try_from_string(text.to_string(), &literal_type).ok()?;
        if parsed.is_null() {
            return None;
        }
        return parsed.partial_cmp(literal);
    }
    let coerced = coerce(literal, &value_type)?;
    value.partial_cmp(&coerced)
}

/// Compare a bound value with a raw textual bound, parsed into the value's type.
pub(crate) fn compare_with_text(value: &ScalarValue, text: &str) -> Option<Ordering> {
    compare(value, &ScalarValue::Utf8(Some(text.to_string())))
}

pub(crate) fn coerce(literal: &ScalarValue, target: &DataType) -> Option<ScalarValue> {
    if literal.data_type() == *target {
        return Some(literal.clone());
    }
    let coerced = match as_str(literal) {
        Some(text) => ScalarValue::try_from_string(text.to_string(), target).ok()?,
        None => literal.cast_to(target).ok()?,
    };
    (!coerced.is_null()).then_some(coerced)
}

pub(crate) fn as_str(value: &ScalarValue) -> Option<&str> {
    match value {
        ScalarValue::Utf8(Some(v)) | ScalarValue::LargeUtf8(Some(v)) | ScalarValue::Utf8View(Some(v)) => {
            Some(v.as_str())
        }
        _ => None,
    }
}

pub(crate) fn scalar_as_i64(value: &ScalarValue) -> Option<i64> {
    match value {
        ScalarValue::Int8(Some(v)) => Some(i64::from(*v)),
        ScalarValue::Int16(Some(v)) => Some(i64::from(*v)),
        ScalarValue::Int32(Some(v)) => Some(i64::from(*v)),
        ScalarValue::Int64(Some(v)) => Some(*v),
        ScalarValue::UInt8(Some(v)) => Some(i64::from(*v)),
        ScalarValue::UInt16(Some(v)) => Some(i64::from(*v)),
        ScalarValue::UInt32(Some(v)) => Some(i64::from(*v)),
        ScalarValue::UInt64(Some(v)) => i64::try_from(*v).ok(),
        other => as_str(other)?.trim().parse().ok(),
    }
}

pub(crate) fn scalar_as_f64(value: &ScalarValue) -> Option<f64> {
    match value {
        ScalarValue::Float32(Some(v)) => Some(f64::from(*v)),
        ScalarValue::Float64(Some(v)) => Some(*v),
        ScalarValue::Date32(Some(days)) => Some(f64::from(*days)),
        other => match as_str(other) {
            Some(text) => text.trim().parse().ok(),
            None => scalar_as_i64(other).map(|v| v as f64),
        },
    }
}

fn is_mixed_numeric(left: &DataType, right: &DataType) -> bool {
    (left.is_integer() && right.is_floating()) || (left.is_floating() && right.is_integer())
}

fn is_string(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
    )
}
