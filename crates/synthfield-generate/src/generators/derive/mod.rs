use synthfield_config::Mapping;
use synthfield_core::{FieldValue, Row};

use crate::errors::GenerationError;

/// Integer quotient of a row field and `divisor`, truncated toward zero.
///
/// A missing or absent source field reads as `0`; booleans read as `0` and `1`.
pub fn divide(
    field: &str,
    source: &str,
    divisor: f64,
    row: &Row,
) -> Result<FieldValue, GenerationError> {
    let numerator = match row.get(source) {
        None | Some(FieldValue::Absent) => 0.0,
        Some(value) => value.as_f64().ok_or_else(|| GenerationError::Coercion {
            field: field.to_string(),
            key: "calculation.field",
            source_field: source.to_string(),
            value: value.to_json().to_string(),
            expected: "a number",
        })?,
    };

    let quotient = (numerator / divisor).trunc();
    if !quotient.is_finite() || quotient < i64::MIN as f64 || quotient >= i64::MAX as f64 {
        return Err(GenerationError::Coercion {
            field: field.to_string(),
            key: "calculation.value",
            source_field: source.to_string(),
            value: quotient.to_string(),
            expected: "representable as a 64-bit integer",
        });
    }
    Ok(FieldValue::Int(quotient as i64))
}

/// Look up the integer form of `mapping.field` in `mapping.values`.
///
/// Returns `Null` when the source field is missing or null, or when the
/// table has no entry for the key.
pub fn map_value(field: &str, mapping: &Mapping, row: &Row) -> Result<FieldValue, GenerationError> {
    let Some(current) = row.get(&mapping.field).filter(|value| !value.is_missing()) else {
        return Ok(FieldValue::Null);
    };

    let key = to_integer(current).ok_or_else(|| GenerationError::Coercion {
        field: field.to_string(),
        key: "mapping.field",
        source_field: mapping.field.clone(),
        value: current.to_json().to_string(),
        expected: "an integer",
    })?;

    Ok(mapping
        .values
        .get(&key.to_string())
        .map(FieldValue::from)
        .unwrap_or(FieldValue::Null))
}

fn to_integer(value: &FieldValue) -> Option<i64> {
    match value {
        FieldValue::Int(value) => Some(*value),
        FieldValue::Float(value) => {
            let truncated = value.trunc();
            (truncated.is_finite()
                && truncated >= i64::MIN as f64
                && truncated < i64::MAX as f64)
                .then_some(truncated as i64)
        }
        FieldValue::Bool(value) => Some(i64::from(*value)),
        FieldValue::Text(value) => value.trim().parse().ok(),
        FieldValue::Absent | FieldValue::Null | FieldValue::Composite(_) => None,
    }
}
