use serde_json::{Map, Value};
use tracing::trace;

use crate::capability::CapabilityTable;
use crate::coerce::encode_scalar;
use crate::descriptor::{FieldDescriptor, FieldType, RecordSchema};
use crate::error::TranscodeError;
use crate::path::FieldPath;
use crate::record::{FieldValue, Record};
use crate::state::{ConfigState, Snapshot};
use crate::transcode::block::assemble_block;
use crate::transcode::table::assemble_rows;
use crate::version::FirmwareVersion;
use crate::WireObject;

/// How absent fields are written to the wire object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssembleMode {
    /// Set fields are sent; fields removed since the prior state are sent
    /// as `null`; everything else is left out.
    #[default]
    Normal,
    /// Every non-computed top-level field is sent as `null`.
    Clear,
}

/// Builds wire objects from configuration state, walking descriptors in
/// declared order.
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    schema: &'a RecordSchema,
    capabilities: CapabilityTable,
    mode: AssembleMode,
    firmware: Option<FirmwareVersion>,
}

impl<'a> Assembler<'a> {
    pub fn new(schema: &'a RecordSchema) -> Self {
        Self {
            schema,
            capabilities: CapabilityTable::from_schema(schema),
            mode: AssembleMode::Normal,
            firmware: None,
        }
    }

    pub fn mode(mut self, mode: AssembleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn firmware(mut self, firmware: Option<FirmwareVersion>) -> Self {
        self.firmware = firmware;
        self
    }

    /// Assemble the planned configuration held by `state`.
    pub fn assemble(&self, state: &dyn ConfigState) -> Result<WireObject, TranscodeError> {
        if self.mode == AssembleMode::Clear {
            return Ok(self.clear_object());
        }
        self.nested_object(&self.schema.fields, state, &FieldPath::root())
    }

    /// Assemble a record with no prior state.
    pub fn assemble_record(&self, record: &Record) -> Result<WireObject, TranscodeError> {
        self.assemble(&Snapshot::fresh(record))
    }

    fn clear_object(&self) -> WireObject {
        let mut out = Map::new();
        for field in self.schema.iter().filter(|field| !field.computed) {
            let path = FieldPath::field(&field.name);
            if self.supported(&path) {
                out.insert(field.wire_name(), Value::Null);
            }
        }
        out
    }

    pub(crate) fn nested_object(
        &self,
        fields: &[FieldDescriptor],
        state: &dyn ConfigState,
        parent: &FieldPath,
    ) -> Result<WireObject, TranscodeError> {
        let mut out = Map::new();
        for field in fields {
            if field.computed {
                continue;
            }
            let path = parent.child(&field.name);

            match state.get_ok(&path) {
                Some(value) => {
                    if let Some(version) = self.firmware.as_ref() {
                        if let Some(range) = self.capabilities.blocking_range(&path, Some(version))
                        {
                            return Err(TranscodeError::Unsupported {
                                path: path.to_string(),
                                version: *version,
                                range,
                            });
                        }
                    }
                    if let Some(wire) = self.field_value(field, value, state, &path)? {
                        out.insert(field.wire_name(), wire);
                    }
                }
                None if state.has_change(&path) && self.supported(&path) => {
                    trace!(path = %path, "clearing removed field");
                    out.insert(field.wire_name(), Value::Null);
                }
                None => {}
            }
        }
        Ok(out)
    }

    fn field_value(
        &self,
        field: &FieldDescriptor,
        value: &FieldValue,
        state: &dyn ConfigState,
        path: &FieldPath,
    ) -> Result<Option<Value>, TranscodeError> {
        match field.field_type {
            FieldType::List | FieldType::Set => {
                let rows = expect_rows(value, path)?;
                assemble_rows(self, field, rows, state, path).map(Some)
            }
            FieldType::Block => {
                let rows = expect_rows(value, path)?;
                Ok(assemble_block(self, field, rows, state, path)?.map(Value::Object))
            }
            FieldType::String | FieldType::Integer | FieldType::Bool => {
                encode_scalar(value, field.field_type, path).map(Some)
            }
        }
    }

    fn supported(&self, path: &FieldPath) -> bool {
        self.capabilities.is_supported(path, self.firmware.as_ref())
    }
}

fn expect_rows<'v>(value: &'v FieldValue, path: &FieldPath) -> Result<&'v [Record], TranscodeError> {
    value
        .as_list()
        .ok_or_else(|| TranscodeError::shape(path, "list", value.kind()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{AssembleMode, Assembler};
    use crate::descriptor::{FieldDescriptor, RecordSchema};
    use crate::error::TranscodeError;
    use crate::record::Record;
    use crate::state::Snapshot;
    use crate::version::FirmwareVersion;

    fn schema() -> RecordSchema {
        RecordSchema::new(vec![
            FieldDescriptor::integer("policyid").computed(),
            FieldDescriptor::string("name"),
            FieldDescriptor::string("comments"),
            FieldDescriptor::list("srcintf", vec![FieldDescriptor::string("name")]),
            FieldDescriptor::list(
                "entry",
                vec![
                    FieldDescriptor::integer("id"),
                    FieldDescriptor::string("note"),
                ],
            ),
            FieldDescriptor::string("cgn_resource_quota").since(FirmwareVersion::new(7, 2, 0)),
        ])
    }

    #[test]
    fn sends_set_fields_with_wire_names_and_skips_computed() {
        let schema = schema();
        let record = Record::new()
            .with("policyid", 4)
            .with("name", "allow-web")
            .with("srcintf", vec![Record::new().with("name", "port1")]);

        let wire = Assembler::new(&schema)
            .assemble_record(&record)
            .expect("assemble");
        assert_eq!(
            serde_json::Value::Object(wire),
            json!({"name": "allow-web", "srcintf": [{"name": "port1"}]})
        );
    }

    #[test]
    fn removed_top_level_field_is_sent_as_null() {
        let schema = schema();
        let prior = Record::new().with("name", "a").with("comments", "old");
        let planned = Record::new().with("name", "a");

        let wire = Assembler::new(&schema)
            .assemble(&Snapshot::new(&planned, Some(&prior)))
            .expect("assemble");
        assert_eq!(wire.get("comments"), Some(&serde_json::Value::Null));
        assert!(!wire.contains_key("srcintf"));
    }

    #[test]
    fn removed_row_field_is_sent_as_null() {
        let schema = schema();
        let prior = Record::new().with(
            "entry",
            vec![Record::new().with("id", 1).with("note", "x")],
        );
        let planned = Record::new().with("entry", vec![Record::new().with("id", 1)]);

        let wire = Assembler::new(&schema)
            .assemble(&Snapshot::new(&planned, Some(&prior)))
            .expect("assemble");
        assert_eq!(wire.get("entry"), Some(&json!([{"id": 1, "note": null}])));
    }

    #[test]
    fn clear_mode_nulls_every_sendable_field() {
        let schema = schema();
        let wire = Assembler::new(&schema)
            .mode(AssembleMode::Clear)
            .firmware(Some(FirmwareVersion::new(7, 0, 0)))
            .assemble_record(&Record::new())
            .expect("assemble");
        let mut keys: Vec<_> = wire.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["comments", "entry", "name", "srcintf"]);
        assert!(wire.values().all(serde_json::Value::is_null));
    }

    #[test]
    fn explicit_field_beyond_firmware_is_rejected() {
        let schema = schema();
        let record = Record::new().with("cgn_resource_quota", "16");
        let err = Assembler::new(&schema)
            .firmware(Some(FirmwareVersion::new(7, 0, 5)))
            .assemble_record(&record)
            .expect_err("unsupported");
        assert!(matches!(err, TranscodeError::Unsupported { ref path, .. } if path == "cgn_resource_quota"));

        let wire = Assembler::new(&schema)
            .firmware(Some(FirmwareVersion::new(7, 2, 1)))
            .assemble_record(&record)
            .expect("supported");
        assert_eq!(wire.get("cgn-resource-quota"), Some(&json!("16")));
    }

    #[test]
    fn wrong_record_shape_is_reported() {
        let schema = schema();
        let record = Record::new().with("srcintf", "port1");
        let err = Assembler::new(&schema)
            .assemble_record(&record)
            .expect_err("shape");
        assert_eq!(err.path(), "srcintf");
    }
}
