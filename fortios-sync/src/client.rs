//! Boundary between the lifecycle operations and a FortiOS device.
//!
//! The lifecycle never talks HTTP itself. It hands assembled wire objects to
//! an [`ApiClient`] together with a [`CallContext`] and reads wire objects
//! back. Two clients ship with the crate: [`MemoryClient`] for tests and
//! [`DirectoryClient`] as an offline device for the CLI.
//!
//! [`MemoryClient`]: crate::memory_client::MemoryClient
//! [`DirectoryClient`]: crate::directory_client::DirectoryClient

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use schema_transcode::{FirmwareVersion, WireObject};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Per-call settings forwarded to the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Target VDOM; `None` means the device default (`root`).
    pub vdom: Option<String>,
    /// Retry budget for the transport. Lifecycle operations never retry.
    pub retries: u32,
    /// Firmware the payload was assembled for.
    pub firmware: Option<FirmwareVersion>,
}

impl CallContext {
    pub fn vdom_or_default(&self) -> &str {
        self.vdom.as_deref().unwrap_or(DEFAULT_VDOM)
    }
}

pub const DEFAULT_VDOM: &str = "root";

/// Errors reported by API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The device answered with an error status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The device answered with something the client cannot interpret.
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid vdom name '{0}'")]
    InvalidVdom(String),
}

impl ApiError {
    pub fn not_found(path: &str, mkey: &str) -> Self {
        ApiError::Http {
            status: 404,
            message: format!("{path} entry '{mkey}' does not exist"),
        }
    }
}

/// CRUD access to CMDB objects.
///
/// Singleton (settings) resources are addressed with an empty `mkey`.
pub trait ApiClient {
    /// Firmware running on the device, when it can be determined.
    fn device_version(&mut self) -> Result<Option<FirmwareVersion>, ApiError>;

    /// Create a table entry. The response carries the entry key as `mkey`.
    fn create(
        &mut self,
        path: &str,
        object: &WireObject,
        ctx: &CallContext,
    ) -> Result<WireObject, ApiError>;

    /// Fetch an entry. `None` means the device has no such object.
    fn read(
        &mut self,
        path: &str,
        mkey: &str,
        ctx: &CallContext,
    ) -> Result<Option<WireObject>, ApiError>;

    /// Apply `object` to an existing entry. `null` members reset the field.
    fn update(
        &mut self,
        path: &str,
        mkey: &str,
        object: &WireObject,
        ctx: &CallContext,
    ) -> Result<WireObject, ApiError>;

    fn delete(&mut self, path: &str, mkey: &str, ctx: &CallContext) -> Result<(), ApiError>;
}

/// Client operation, as recorded in call logs and fault plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiAction {
    Version,
    Create,
    Read,
    Update,
    Delete,
}

impl Display for ApiAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiAction::Version => "version",
            ApiAction::Create => "create",
            ApiAction::Read => "read",
            ApiAction::Update => "update",
            ApiAction::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Wire field names holding the primary key, per API path.
///
/// FortiOS derives the key from the object body; offline clients need the
/// same knowledge to store and echo it.
#[derive(Debug, Clone, Default)]
pub struct KeyFields {
    fields: BTreeMap<String, String>,
}

impl KeyFields {
    pub fn insert(&mut self, path: impl Into<String>, wire_field: impl Into<String>) {
        self.fields.insert(path.into(), wire_field.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.fields.get(path).map(String::as_str)
    }

    /// Key for a new entry: the object's own key when present and non-zero,
    /// otherwise the next integer after the numeric keys in `existing`.
    /// The chosen key is written back into `object`.
    pub fn assign<'a>(
        &self,
        path: &str,
        object: &mut WireObject,
        existing: impl Iterator<Item = &'a str>,
    ) -> String {
        let field = self.get(path);
        if let Some(key) = field.and_then(|name| object.get(name)).and_then(render_mkey) {
            if key != "0" && !key.is_empty() {
                return key;
            }
        }

        let next = existing
            .filter_map(|key| key.parse::<i64>().ok())
            .max()
            .map_or(1, |max| max.saturating_add(1));
        if let Some(name) = field {
            object.insert(name.to_string(), Value::from(next));
        }
        next.to_string()
    }
}

/// Render a key value the way FortiOS addresses it in URLs.
pub fn render_mkey(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64))
            .map(|int| int.to_string()),
        _ => None,
    }
}

/// Merge an update into a stored object: `null` members remove the field,
/// everything else replaces it.
pub fn merge_update(stored: &mut WireObject, patch: &WireObject) {
    for (key, value) in patch {
        if value.is_null() {
            stored.remove(key);
        } else {
            stored.insert(key.clone(), value.clone());
        }
    }
}

/// Standard create/update response body.
pub fn mkey_response(mkey: &str) -> WireObject {
    let mut response = WireObject::new();
    response.insert("status".to_string(), Value::from("success"));
    response.insert("http_status".to_string(), Value::from(200));
    response.insert("mkey".to_string(), Value::from(mkey));
    response
}
