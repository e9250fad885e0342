//! Singleton nested blocks, held in records as a one-element list.

use serde_json::{Map, Value};
use tracing::debug;

use crate::descriptor::FieldDescriptor;
use crate::error::{json_kind, TranscodeError};
use crate::path::FieldPath;
use crate::record::{FieldValue, Record};
use crate::state::ConfigState;
use crate::transcode::assemble::Assembler;
use crate::transcode::disassemble::Disassembler;

/// Wire object -> one-element list. `null` decodes to "not set".
pub(crate) fn disassemble_block(
    disassembler: &Disassembler<'_>,
    field: &FieldDescriptor,
    raw: &Value,
    path: &FieldPath,
) -> Result<Option<FieldValue>, TranscodeError> {
    match raw {
        Value::Null => Ok(None),
        Value::Object(object) => {
            let row = disassembler.nested_record(&field.fields, object, &path.index(0))?;
            Ok(Some(FieldValue::List(vec![row])))
        }
        other => Err(TranscodeError::shape(path, "object", json_kind(other))),
    }
}

/// First row -> wire object. An empty list yields `None` so the field is
/// left out rather than sent as `{}`.
pub(crate) fn assemble_block(
    assembler: &Assembler<'_>,
    field: &FieldDescriptor,
    rows: &[Record],
    state: &dyn ConfigState,
    path: &FieldPath,
) -> Result<Option<Map<String, Value>>, TranscodeError> {
    if rows.is_empty() {
        return Ok(None);
    }
    if rows.len() > 1 {
        debug!(
            path = %path,
            extra = rows.len() - 1,
            "ignoring extra rows of single-object block"
        );
    }
    assembler
        .nested_object(&field.fields, state, &path.index(0))
        .map(Some)
}
