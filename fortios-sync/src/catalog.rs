use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use schema_transcode::{FieldDescriptor, RecordSchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One FortiOS resource type: where it lives in the API and its field table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    /// Catalog name, e.g. `system_ddns`.
    pub name: String,
    /// CMDB API path, e.g. `system/ddns`.
    pub path: String,
    /// Field holding the primary key for table resources.
    pub mkey: Option<String>,
    /// Settings objects have exactly one instance and no key.
    pub singleton: bool,
    pub description: String,
    pub schema: RecordSchema,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceFile {
    name: String,
    path: String,
    #[serde(default)]
    mkey: Option<String>,
    #[serde(default)]
    singleton: bool,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "field")]
    fields: Vec<FieldDescriptor>,
}

/// Errors returned when loading resource descriptor files.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to read resource file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse resource file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid resource file {path}: {reason}")]
    Invalid { path: String, reason: String },
}

const EMBEDDED: &[(&str, &str)] = &[
    (
        "firewall_policy",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/schemas/firewall_policy.toml"
        )),
    ),
    (
        "vpn_certificate_local",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/schemas/vpn_certificate_local.toml"
        )),
    ),
    (
        "wireless_controller_setting",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/schemas/wireless_controller_setting.toml"
        )),
    ),
    (
        "system_ddns",
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/schemas/system_ddns.toml")),
    ),
    (
        "system_password_policy",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/schemas/system_password_policy.toml"
        )),
    ),
    (
        "switch_controller_fortilink_settings",
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/schemas/switch_controller_fortilink_settings.toml"
        )),
    ),
    (
        "user_local",
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/schemas/user_local.toml")),
    ),
];

/// Resource types known to the tool, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    types: BTreeMap<String, ResourceType>,
    sources: BTreeMap<String, String>,
}

impl Catalog {
    /// Catalog built from the descriptor tables compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogLoadError> {
        let mut catalog = Self::default();
        for (name, raw) in EMBEDDED {
            let resource = parse_resource_type(raw, format!("embedded {name}"))?;
            catalog.insert(resource, "embedded".to_string());
        }
        Ok(catalog)
    }

    /// Embedded catalog where every `<name>.toml` in `dir` replaces or adds
    /// a resource type.
    pub fn with_overrides(dir: &Path) -> Result<Self, CatalogLoadError> {
        let mut catalog = Self::embedded()?;
        let entries = fs::read_dir(dir).map_err(|source| CatalogLoadError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CatalogLoadError::Io {
                path: dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                files.push(path);
            }
        }
        files.sort();

        for path in files {
            let resource = load_resource_type(&path)?;
            catalog.insert(resource, format!("file:{}", path.display()));
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, resource: ResourceType, source: String) {
        self.sources.insert(resource.name.clone(), source);
        self.types.insert(resource.name.clone(), resource);
    }

    pub fn get(&self, name: &str) -> Option<&ResourceType> {
        self.types.get(name)
    }

    /// Where a resource type was loaded from: `embedded` or `file:<path>`.
    pub fn source(&self, name: &str) -> Option<&str> {
        self.sources.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Load one resource type from a TOML file.
pub fn load_resource_type(path: &Path) -> Result<ResourceType, CatalogLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_resource_type(&raw, path.display().to_string())
}

fn parse_resource_type(raw: &str, path: String) -> Result<ResourceType, CatalogLoadError> {
    let file: ResourceFile = toml::from_str(raw).map_err(|source| CatalogLoadError::Parse {
        path: path.clone(),
        source,
    })?;

    if let Some(name) = numeric_field_name(&file.fields) {
        return Err(CatalogLoadError::Invalid {
            path,
            reason: format!("field name '{name}' is numeric and would read as a row index"),
        });
    }

    let schema = RecordSchema::new(file.fields);
    match (&file.mkey, file.singleton) {
        (Some(_), true) => {
            return Err(CatalogLoadError::Invalid {
                path,
                reason: "singleton resources cannot declare an mkey".to_string(),
            })
        }
        (None, false) => {
            return Err(CatalogLoadError::Invalid {
                path,
                reason: "table resources must declare an mkey".to_string(),
            })
        }
        (Some(mkey), false) if schema.field(mkey).is_none() => {
            return Err(CatalogLoadError::Invalid {
                path,
                reason: format!("mkey '{mkey}' is not a declared field"),
            })
        }
        _ => {}
    }

    Ok(ResourceType {
        name: file.name,
        path: file.path,
        mkey: file.mkey,
        singleton: file.singleton,
        description: file.description,
        schema,
    })
}

// Dotted field paths treat all-digit segments as row indices.
fn numeric_field_name(fields: &[FieldDescriptor]) -> Option<&str> {
    fields.iter().find_map(|field| {
        if !field.name.is_empty() && field.name.bytes().all(|b| b.is_ascii_digit()) {
            Some(field.name.as_str())
        } else {
            numeric_field_name(&field.fields)
        }
    })
}
