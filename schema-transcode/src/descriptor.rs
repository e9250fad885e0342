//! Declarative field descriptor tables.
//!
//! A [`RecordSchema`] is the ordered list of [`FieldDescriptor`]s for one
//! record type. Tables are static: they are loaded once (usually from TOML)
//! and drive every assemble, disassemble, validate and diff walk.

use serde::{Deserialize, Serialize};

use crate::path::to_wire_name;
use crate::record::FieldValue;
use crate::version::{FirmwareVersion, VersionRange};

/// Semantic type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Bool,
    /// Ordered table of nested rows.
    List,
    /// Unordered table of nested rows; never re-sorted.
    Set,
    /// Single nested object, stored as a one-element list.
    Block,
}

impl FieldType {
    pub fn is_nested(self) -> bool {
        matches!(self, FieldType::List | FieldType::Set | FieldType::Block)
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Bool => "bool",
            FieldType::List => "list",
            FieldType::Set => "set",
            FieldType::Block => "block",
        }
    }
}

/// Metadata for one field of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Set by the device only; never sent.
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub default: Option<FieldValue>,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    /// Maximum string length.
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Child field used to order list rows after disassembly.
    #[serde(default)]
    pub sort_key: Option<String>,
    #[serde(default)]
    pub since: Option<FirmwareVersion>,
    #[serde(default)]
    pub until: Option<FirmwareVersion>,
    #[serde(default, rename = "field", skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            computed: false,
            sensitive: false,
            default: None,
            min: None,
            max: None,
            size: None,
            options: Vec::new(),
            sort_key: None,
            since: None,
            until: None,
            fields: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn list(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, FieldType::List).with_fields(fields)
    }

    pub fn set(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, FieldType::Set).with_fields(fields)
    }

    pub fn block(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self::new(name, FieldType::Block).with_fields(fields)
    }

    pub fn with_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = fields;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn bounds(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(ToString::to_string).collect();
        self
    }

    pub fn sort_key(mut self, key: impl Into<String>) -> Self {
        self.sort_key = Some(key.into());
        self
    }

    pub fn since(mut self, version: FirmwareVersion) -> Self {
        self.since = Some(version);
        self
    }

    pub fn until(mut self, version: FirmwareVersion) -> Self {
        self.until = Some(version);
        self
    }

    pub fn wire_name(&self) -> String {
        to_wire_name(&self.name)
    }

    pub fn version_range(&self) -> VersionRange {
        VersionRange::new(self.since, self.until)
    }

    pub fn child(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// Ordered descriptor table for one record type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDescriptor>,
}

impl RecordSchema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldDescriptor, FieldType, RecordSchema};
    use crate::record::FieldValue;
    use crate::version::FirmwareVersion;

    #[test]
    fn parses_nested_descriptor_table_from_toml() {
        let raw = r#"
[[field]]
name = "name"
type = "string"
size = 35

[[field]]
name = "nac_ports"
type = "block"
since = "7.0.0"

[[field.field]]
name = "onboarding_vlan"
type = "string"
default = ""

[[field.field]]
name = "member_change"
type = "integer"
min = 0
max = 255
"#;
        let schema: RecordSchema = toml::from_str(raw).expect("schema toml");
        assert_eq!(schema.len(), 2);

        let nac = schema.field("nac_ports").expect("nac_ports");
        assert_eq!(nac.field_type, FieldType::Block);
        assert_eq!(nac.since, Some(FirmwareVersion::new(7, 0, 0)));
        assert_eq!(nac.wire_name(), "nac-ports");
        assert_eq!(
            nac.child("onboarding_vlan").and_then(|f| f.default.clone()),
            Some(FieldValue::String(String::new()))
        );
        assert_eq!(nac.child("member_change").and_then(|f| f.max), Some(255));
    }

    #[test]
    fn builder_sets_flags() {
        let field = FieldDescriptor::integer("ttl")
            .bounds(60, 86400)
            .default_value(300)
            .required();
        assert!(field.required);
        assert_eq!(field.min, Some(60));
        assert_eq!(field.default, Some(FieldValue::Integer(300)));
        assert!(!field.field_type.is_nested());
    }
}
