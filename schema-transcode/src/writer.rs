use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::record::Record;
use crate::WireObject;

/// Errors that can occur while writing wire objects or records.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to serialize JSON bytes.
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to write output file.
    #[error("failed to write JSON file: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize a wire object into pretty-printed JSON bytes.
pub fn write_wire(object: &WireObject) -> Result<Vec<u8>, WriteError> {
    let mut bytes = serde_json::to_vec_pretty(object)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize a wire object and write it to `path`.
pub fn write_wire_file(object: &WireObject, path: &Path) -> Result<(), WriteError> {
    let bytes = write_wire(object)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Serialize a record into pretty-printed JSON bytes.
pub fn write_record(record: &Record) -> Result<Vec<u8>, WriteError> {
    let mut bytes = serde_json::to_vec_pretty(record)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::write_record;
    use crate::record::Record;

    #[test]
    fn record_output_is_snake_case_json_with_trailing_newline() {
        let record = Record::new().with("email_to", "ops@example.com").with("id", 3);
        let bytes = write_record(&record).expect("write");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"email_to\": \"ops@example.com\""));
        assert!(text.contains("\"id\": 3"));
    }
}
