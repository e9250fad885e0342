use std::collections::BTreeMap;

use crate::descriptor::{FieldDescriptor, RecordSchema};
use crate::path::FieldPath;
use crate::version::{FirmwareVersion, VersionRange};

/// Firmware availability of fields, keyed by index-free dotted path.
///
/// Only fields with a `since` or `until` bound are stored; every other field
/// is available on every firmware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityTable {
    ranges: BTreeMap<String, VersionRange>,
}

impl CapabilityTable {
    pub fn from_schema(schema: &RecordSchema) -> Self {
        let mut table = Self::default();
        for field in schema.iter() {
            table.collect(field, "");
        }
        table
    }

    fn collect(&mut self, field: &FieldDescriptor, prefix: &str) {
        let key = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{prefix}.{}", field.name)
        };
        let range = field.version_range();
        if !range.is_unbounded() {
            self.ranges.insert(key.clone(), range);
        }
        for child in &field.fields {
            self.collect(child, &key);
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, range: VersionRange) {
        self.ranges.insert(key.into(), range);
    }

    /// Range declared directly on `key`, if bounded.
    pub fn range(&self, key: &str) -> Option<&VersionRange> {
        self.ranges.get(key)
    }

    /// Whether the field at `path` should exist on `version`.
    ///
    /// The field and every enclosing field must be available. An unknown
    /// firmware version supports everything.
    pub fn is_supported(&self, path: &FieldPath, version: Option<&FirmwareVersion>) -> bool {
        self.blocking_range(path, version).is_none()
    }

    /// The first range along `path` that excludes `version`.
    pub fn blocking_range(
        &self,
        path: &FieldPath,
        version: Option<&FirmwareVersion>,
    ) -> Option<VersionRange> {
        let version = version?;
        let key = path.schema_key();
        let mut prefix = String::new();
        for part in key.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(part);
            if let Some(range) = self.ranges.get(&prefix) {
                if !range.contains(version) {
                    return Some(*range);
                }
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &VersionRange)> {
        self.ranges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::CapabilityTable;
    use crate::descriptor::{FieldDescriptor, RecordSchema};
    use crate::path::FieldPath;
    use crate::version::FirmwareVersion;

    fn schema() -> RecordSchema {
        RecordSchema::new(vec![
            FieldDescriptor::string("name"),
            FieldDescriptor::block(
                "nac_ports",
                vec![
                    FieldDescriptor::string("onboarding_vlan"),
                    FieldDescriptor::string("bounce_nac_port").since(FirmwareVersion::new(7, 2, 0)),
                ],
            )
            .since(FirmwareVersion::new(6, 4, 0)),
            FieldDescriptor::string("legacy_mode").until(FirmwareVersion::new(6, 4, 15)),
        ])
    }

    #[test]
    fn collects_only_bounded_fields() {
        let table = CapabilityTable::from_schema(&schema());
        assert_eq!(table.len(), 3);
        assert!(table.range("name").is_none());
        assert!(table.range("nac_ports.bounce_nac_port").is_some());
    }

    #[test]
    fn nested_field_requires_enclosing_block() {
        let table = CapabilityTable::from_schema(&schema());
        let path = FieldPath::field("nac_ports").index(0).child("onboarding_vlan");

        assert!(!table.is_supported(&path, Some(&FirmwareVersion::new(6, 2, 0))));
        assert!(table.is_supported(&path, Some(&FirmwareVersion::new(7, 0, 0))));

        let bounce = FieldPath::field("nac_ports").index(0).child("bounce_nac_port");
        assert!(!table.is_supported(&bounce, Some(&FirmwareVersion::new(7, 0, 0))));
        assert!(table.is_supported(&bounce, Some(&FirmwareVersion::new(7, 2, 4))));
    }

    #[test]
    fn unknown_version_supports_everything() {
        let table = CapabilityTable::from_schema(&schema());
        assert!(table.is_supported(&FieldPath::field("legacy_mode"), None));
        assert!(!table.is_supported(
            &FieldPath::field("legacy_mode"),
            Some(&FirmwareVersion::new(7, 0, 0))
        ));
    }
}
