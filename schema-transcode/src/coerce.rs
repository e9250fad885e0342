use serde_json::{Number, Value};

use crate::descriptor::FieldType;
use crate::error::{json_kind, TranscodeError};
use crate::path::FieldPath;
use crate::record::FieldValue;

/// Decode a scalar wire value into the descriptor's semantic type.
///
/// Returns `Ok(None)` for `null`, which means "not set". Integer targets
/// also treat an empty string as not set.
pub fn decode_scalar(
    wire: &Value,
    field_type: FieldType,
    path: &FieldPath,
) -> Result<Option<FieldValue>, TranscodeError> {
    if wire.is_null() {
        return Ok(None);
    }

    match field_type {
        FieldType::Integer => decode_integer(wire, path),
        FieldType::String => decode_string(wire, path),
        FieldType::Bool => match wire {
            Value::Bool(value) => Ok(Some(FieldValue::Bool(*value))),
            other => Err(TranscodeError::shape(path, "bool", json_kind(other))),
        },
        FieldType::List | FieldType::Set | FieldType::Block => Err(TranscodeError::shape(
            path,
            "scalar descriptor",
            field_type.name(),
        )),
    }
}

/// Encode a scalar record value, checking it against the descriptor type.
pub fn encode_scalar(
    value: &FieldValue,
    field_type: FieldType,
    path: &FieldPath,
) -> Result<Value, TranscodeError> {
    match (field_type, value) {
        (FieldType::String, FieldValue::String(v)) => Ok(Value::String(v.clone())),
        (FieldType::Integer, FieldValue::Integer(v)) => Ok(Value::Number(Number::from(*v))),
        (FieldType::Bool, FieldValue::Bool(v)) => Ok(Value::Bool(*v)),
        (expected, found) => Err(TranscodeError::shape(path, expected.name(), found.kind())),
    }
}

fn decode_integer(wire: &Value, path: &FieldPath) -> Result<Option<FieldValue>, TranscodeError> {
    match wire {
        Value::Number(number) => Ok(Some(FieldValue::Integer(number_to_i64(number)))),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            if let Ok(value) = text.parse::<i64>() {
                return Ok(Some(FieldValue::Integer(value)));
            }
            text.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| Some(FieldValue::Integer(value.trunc() as i64)))
                .ok_or_else(|| TranscodeError::shape(path, "integer", format!("string {text:?}")))
        }
        other => Err(TranscodeError::shape(path, "integer", json_kind(other))),
    }
}

/// Truncate toward zero; values beyond the `i64` range saturate.
fn number_to_i64(number: &Number) -> i64 {
    if let Some(value) = number.as_i64() {
        return value;
    }
    if number.as_u64().is_some() {
        return i64::MAX;
    }
    number.as_f64().map_or(0, |value| value.trunc() as i64)
}

fn decode_string(wire: &Value, path: &FieldPath) -> Result<Option<FieldValue>, TranscodeError> {
    match wire {
        Value::String(text) => Ok(Some(FieldValue::String(text.clone()))),
        Value::Number(number) => Ok(Some(FieldValue::String(number_to_text(number)))),
        Value::Bool(value) => Ok(Some(FieldValue::String(value.to_string()))),
        other => Err(TranscodeError::shape(path, "string", json_kind(other))),
    }
}

fn number_to_text(number: &Number) -> String {
    match number.as_f64() {
        Some(value) if number.is_f64() && value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", value as i64)
        }
        _ => number.to_string(),
    }
}
