use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::error::json_kind;
use crate::record::Record;
use crate::WireObject;

/// Errors that can occur while reading wire objects or records.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input was not valid JSON, or did not fit the record model.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to read input file.
    #[error("failed to read JSON file: {0}")]
    Io(#[from] std::io::Error),
    /// Valid JSON of the wrong shape.
    #[error("malformed input: {0}")]
    Malformed(String),
}

/// Parse JSON bytes holding a single wire object.
pub fn parse_wire(json: &[u8]) -> Result<WireObject, ParseError> {
    match serde_json::from_slice::<Value>(json)? {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::Malformed(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
    }
}

/// Parse a wire object from a file.
pub fn parse_wire_file(path: &Path) -> Result<WireObject, ParseError> {
    let bytes = fs::read(path)?;
    parse_wire(&bytes)
}

/// Parse a FortiOS REST response and return the object it carries.
///
/// Responses wrap objects as `{"results": [ {...} ], ...}` (or a bare
/// `results` object for settings). A plain object without `results` is
/// returned unchanged; an empty `results` array yields `None`.
pub fn parse_response(json: &[u8]) -> Result<Option<WireObject>, ParseError> {
    let mut object = parse_wire(json)?;
    match object.remove("results") {
        None => Ok(Some(object)),
        Some(Value::Object(result)) => Ok(Some(result)),
        Some(Value::Array(items)) => match items.into_iter().next() {
            None => Ok(None),
            Some(Value::Object(result)) => Ok(Some(result)),
            Some(other) => Err(ParseError::Malformed(format!(
                "expected results to hold objects, found {}",
                json_kind(&other)
            ))),
        },
        Some(Value::Null) => Ok(None),
        Some(other) => Err(ParseError::Malformed(format!(
            "unexpected results value of type {}",
            json_kind(&other)
        ))),
    }
}

/// Parse JSON bytes holding a configuration record.
pub fn parse_record(json: &[u8]) -> Result<Record, ParseError> {
    Ok(serde_json::from_slice(json)?)
}

/// Parse a configuration record from a file.
pub fn parse_record_file(path: &Path) -> Result<Record, ParseError> {
    let bytes = fs::read(path)?;
    parse_record(&bytes)
}

#[cfg(test)]
mod tests {
    use super::{parse_response, parse_wire, ParseError};

    #[test]
    fn rejects_non_object_wire_input() {
        let err = parse_wire(b"[1,2]").expect_err("array is not an object");
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn unwraps_results_envelope() {
        let body = br#"{"http_method":"GET","results":[{"name":"test1"}],"vdom":"root","status":"success"}"#;
        let object = parse_response(body).expect("parse").expect("object");
        assert_eq!(object.get("name").and_then(|v| v.as_str()), Some("test1"));
    }

    #[test]
    fn empty_results_mean_not_found() {
        let body = br#"{"results":[],"status":"success"}"#;
        assert!(parse_response(body).expect("parse").is_none());
    }
}
