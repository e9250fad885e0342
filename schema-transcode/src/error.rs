use thiserror::Error;

use crate::version::{FirmwareVersion, VersionRange};

/// Errors raised while converting between wire objects and records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    /// The value at `path` has a different JSON or record shape than its
    /// descriptor declares.
    #[error("unexpected shape at '{path}': expected {expected}, found {found}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
        found: String,
    },
    /// A field was set explicitly but the detected firmware does not carry it.
    #[error("argument '{path}' is not supported on FortiOS {version} (available {range})")]
    Unsupported {
        path: String,
        version: FirmwareVersion,
        range: VersionRange,
    },
}

impl TranscodeError {
    pub fn shape(path: impl ToString, expected: &'static str, found: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            path: path.to_string(),
            expected,
            found: found.into(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::UnexpectedShape { path, .. } | Self::Unsupported { path, .. } => path,
        }
    }
}

/// Name of a JSON value's shape for error messages.
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
