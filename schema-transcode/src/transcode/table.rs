//! Nested table (list/set) conversion.

use serde_json::Value;

use crate::descriptor::{FieldDescriptor, FieldType};
use crate::error::{json_kind, TranscodeError};
use crate::path::FieldPath;
use crate::record::{FieldValue, Record};
use crate::state::ConfigState;
use crate::transcode::assemble::Assembler;
use crate::transcode::disassemble::Disassembler;
use crate::transcode::sort::sort_rows;

/// Wire array -> table rows. `null` and `[]` both decode to "not set".
pub(crate) fn disassemble_rows(
    disassembler: &Disassembler<'_>,
    field: &FieldDescriptor,
    raw: &Value,
    path: &FieldPath,
) -> Result<Option<FieldValue>, TranscodeError> {
    let items = match raw {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        other => return Err(TranscodeError::shape(path, "array", json_kind(other))),
    };
    if items.is_empty() {
        return Ok(None);
    }

    let mut rows: Vec<Record> = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let row_path = path.index(idx);
        let Value::Object(object) = item else {
            return Err(TranscodeError::shape(&row_path, "object", json_kind(item)));
        };
        rows.push(disassembler.nested_record(&field.fields, object, &row_path)?);
    }

    if field.field_type == FieldType::List {
        if let Some(key) = &field.sort_key {
            sort_rows(&mut rows, key, disassembler.sort_mode());
        }
    }

    Ok(Some(FieldValue::List(rows)))
}

/// Table rows -> wire array, one object per row in order.
pub(crate) fn assemble_rows(
    assembler: &Assembler<'_>,
    field: &FieldDescriptor,
    rows: &[Record],
    state: &dyn ConfigState,
    path: &FieldPath,
) -> Result<Value, TranscodeError> {
    let mut out = Vec::with_capacity(rows.len());
    for idx in 0..rows.len() {
        let object = assembler.nested_object(&field.fields, state, &path.index(idx))?;
        out.push(Value::Object(object));
    }
    Ok(Value::Array(out))
}
