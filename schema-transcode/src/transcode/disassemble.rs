use serde_json::Value;
use tracing::{trace, warn};

use crate::capability::CapabilityTable;
use crate::coerce::decode_scalar;
use crate::descriptor::{FieldDescriptor, FieldType, RecordSchema};
use crate::error::TranscodeError;
use crate::path::{from_wire_name, FieldPath};
use crate::record::{FieldValue, Record};
use crate::transcode::block::disassemble_block;
use crate::transcode::sort::SortMode;
use crate::transcode::table::disassemble_rows;
use crate::version::FirmwareVersion;
use crate::WireObject;

/// Builds configuration records from wire objects.
#[derive(Debug, Clone)]
pub struct Disassembler<'a> {
    schema: &'a RecordSchema,
    capabilities: CapabilityTable,
    sort: SortMode,
    firmware: Option<FirmwareVersion>,
}

impl<'a> Disassembler<'a> {
    pub fn new(schema: &'a RecordSchema) -> Self {
        Self {
            schema,
            capabilities: CapabilityTable::from_schema(schema),
            sort: SortMode::None,
            firmware: None,
        }
    }

    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn firmware(mut self, firmware: Option<FirmwareVersion>) -> Self {
        self.firmware = firmware;
        self
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    /// Decode a wire object. Top-level fields missing on the wire stay unset.
    pub fn disassemble(&self, wire: &WireObject) -> Result<Record, TranscodeError> {
        self.record(&self.schema.fields, wire, &FieldPath::root(), false)
    }

    /// Decode one nested row; absent children take their declared default.
    pub(crate) fn nested_record(
        &self,
        fields: &[FieldDescriptor],
        wire: &WireObject,
        parent: &FieldPath,
    ) -> Result<Record, TranscodeError> {
        self.record(fields, wire, parent, true)
    }

    fn record(
        &self,
        fields: &[FieldDescriptor],
        wire: &WireObject,
        parent: &FieldPath,
        apply_defaults: bool,
    ) -> Result<Record, TranscodeError> {
        let mut out = Record::new();

        for field in fields {
            let path = parent.child(&field.name);
            let raw = wire.get(&field.wire_name());

            match self.field_value(field, raw, &path) {
                Ok(Some(value)) => out.set(field.name.clone(), value),
                Ok(None) => {
                    if apply_defaults {
                        if let Some(default) = &field.default {
                            out.set(field.name.clone(), default.clone());
                        }
                    }
                }
                Err(err) if self.tolerates(raw, &path) => {
                    warn!(path = %path, error = %err, "dropping field the running firmware does not carry");
                }
                Err(err) => return Err(err),
            }
        }

        for key in wire.keys() {
            let name = from_wire_name(key);
            if !fields.iter().any(|field| field.name == name) {
                trace!(parent = %parent, key = %key, "ignoring wire key without descriptor");
            }
        }

        Ok(out)
    }

    fn field_value(
        &self,
        field: &FieldDescriptor,
        raw: Option<&Value>,
        path: &FieldPath,
    ) -> Result<Option<FieldValue>, TranscodeError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        match field.field_type {
            FieldType::List | FieldType::Set => disassemble_rows(self, field, raw, path),
            FieldType::Block => disassemble_block(self, field, raw, path),
            FieldType::String | FieldType::Integer | FieldType::Bool => {
                decode_scalar(raw, field.field_type, path)
            }
        }
    }

    /// A decode failure is tolerated when the wire carries no value or when
    /// the field is not expected on the detected firmware.
    fn tolerates(&self, raw: Option<&Value>, path: &FieldPath) -> bool {
        raw.map_or(true, Value::is_null)
            || !self.capabilities.is_supported(path, self.firmware.as_ref())
    }
}
