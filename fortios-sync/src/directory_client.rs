use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use schema_transcode::{parse_wire, write_wire_file, FirmwareVersion, WireObject, WriteError};
use tracing::debug;

use crate::client::{merge_update, mkey_response, ApiClient, ApiError, CallContext, KeyFields};

/// File holding the firmware version string of the offline device.
pub const VERSION_FILE: &str = "VERSION";
/// File name used for singleton (settings) objects.
pub const SETTINGS_FILE: &str = "settings.json";

/// Offline device backed by a directory of JSON files.
///
/// Objects live at `<root>/<vdom>/<api-path>/<mkey>.json`; settings objects
/// use [`SETTINGS_FILE`] in place of the key.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    root: PathBuf,
    keys: KeyFields,
}

impl DirectoryClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            keys: KeyFields::default(),
        }
    }

    pub fn key_field(mut self, path: &str, wire_field: &str) -> Self {
        self.keys.insert(path, wire_field);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // The vdom becomes a directory name and must stay below `root`.
    fn table_dir(&self, path: &str, ctx: &CallContext) -> Result<PathBuf, ApiError> {
        let vdom = ctx.vdom_or_default();
        if vdom.is_empty() || vdom.contains(['/', '\\']) || vdom.contains("..") {
            return Err(ApiError::InvalidVdom(vdom.to_string()));
        }
        let mut dir = self.root.join(vdom);
        for segment in path.split('/').filter(|segment| !segment.is_empty()) {
            dir.push(segment);
        }
        Ok(dir)
    }

    fn object_path(
        &self,
        path: &str,
        mkey: &str,
        ctx: &CallContext,
    ) -> Result<PathBuf, ApiError> {
        let file = if mkey.is_empty() {
            SETTINGS_FILE.to_string()
        } else {
            format!("{}.json", encode_key(mkey))
        };
        Ok(self.table_dir(path, ctx)?.join(file))
    }

    fn load(&self, file: &Path) -> Result<Option<WireObject>, ApiError> {
        match fs::read(file) {
            Ok(bytes) => parse_wire(&bytes)
                .map(Some)
                .map_err(|err| ApiError::Malformed(format!("{}: {err}", file.display()))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, file: &Path, object: &WireObject) -> Result<(), ApiError> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        write_wire_file(object, file).map_err(|err| match err {
            WriteError::Io(err) => ApiError::Io(err),
            WriteError::Json(err) => ApiError::Json(err),
        })
    }

    fn existing_keys(&self, dir: &Path) -> Result<Vec<String>, ApiError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    keys.push(decode_key(stem));
                }
            }
        }
        Ok(keys)
    }
}

impl ApiClient for DirectoryClient {
    fn device_version(&mut self) -> Result<Option<FirmwareVersion>, ApiError> {
        let file = self.root.join(VERSION_FILE);
        match fs::read_to_string(&file) {
            Ok(raw) => raw
                .parse()
                .map(Some)
                .map_err(|err| ApiError::Malformed(format!("{}: {err}", file.display()))),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn create(
        &mut self,
        path: &str,
        object: &WireObject,
        ctx: &CallContext,
    ) -> Result<WireObject, ApiError> {
        let dir = self.table_dir(path, ctx)?;
        let existing = self.existing_keys(&dir)?;
        let mut stored = WireObject::new();
        merge_update(&mut stored, object);
        let mkey = self
            .keys
            .assign(path, &mut stored, existing.iter().map(String::as_str));

        let file = self.object_path(path, &mkey, ctx)?;
        if file.exists() {
            return Err(ApiError::Http {
                status: 500,
                message: format!("{path} entry '{mkey}' already exists"),
            });
        }
        debug!(file = %file.display(), "storing new object");
        self.store(&file, &stored)?;
        Ok(mkey_response(&mkey))
    }

    fn read(
        &mut self,
        path: &str,
        mkey: &str,
        ctx: &CallContext,
    ) -> Result<Option<WireObject>, ApiError> {
        self.load(&self.object_path(path, mkey, ctx)?)
    }

    fn update(
        &mut self,
        path: &str,
        mkey: &str,
        object: &WireObject,
        ctx: &CallContext,
    ) -> Result<WireObject, ApiError> {
        let file = self.object_path(path, mkey, ctx)?;
        let mut stored = match self.load(&file)? {
            Some(stored) => stored,
            None if mkey.is_empty() => WireObject::new(),
            None => return Err(ApiError::not_found(path, mkey)),
        };
        merge_update(&mut stored, object);
        self.store(&file, &stored)?;
        Ok(mkey_response(mkey))
    }

    fn delete(&mut self, path: &str, mkey: &str, ctx: &CallContext) -> Result<(), ApiError> {
        let file = self.object_path(path, mkey, ctx)?;
        match fs::remove_file(&file) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(ApiError::not_found(path, mkey)),
            Err(err) => Err(err.into()),
        }
    }
}

// Keys may contain '/' (e.g. subnets), which cannot appear in file names.
fn encode_key(mkey: &str) -> String {
    mkey.replace('%', "%25").replace('/', "%2F")
}

fn decode_key(stem: &str) -> String {
    stem.replace("%2F", "/").replace("%25", "%")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    use super::{decode_key, encode_key, DirectoryClient};
    use crate::client::{ApiClient, ApiError, CallContext};
    use schema_transcode::{FirmwareVersion, WireObject};

    fn object(value: Value) -> WireObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn stores_objects_under_vdom_and_api_path() {
        let dir = tempdir().expect("tempdir");
        let mut client = DirectoryClient::new(dir.path()).key_field("user/local", "name");
        let ctx = CallContext::default();

        let response = client
            .create("user/local", &object(json!({"name": "test1"})), &ctx)
            .expect("create");
        assert_eq!(response.get("mkey"), Some(&json!("test1")));
        assert!(dir.path().join("root/user/local/test1.json").is_file());

        let read = client.read("user/local", "test1", &ctx).expect("read");
        assert_eq!(read, Some(object(json!({"name": "test1"}))));
    }

    #[test]
    fn update_merges_and_delete_removes() {
        let dir = tempdir().expect("tempdir");
        let mut client = DirectoryClient::new(dir.path());
        let ctx = CallContext {
            vdom: Some("dmz".to_string()),
            ..CallContext::default()
        };
        client
            .update("system/password-policy", "", &object(json!({"status": "enable"})), &ctx)
            .expect("update");
        assert!(dir.path().join("dmz/system/password-policy/settings.json").is_file());

        let err = client.delete("user/local", "ghost", &ctx).expect_err("missing");
        assert!(matches!(err, ApiError::Http { status: 404, .. }));
    }

    #[test]
    fn vdom_cannot_escape_the_store_root() {
        let dir = tempdir().expect("tempdir");
        let store = dir.path().join("store");
        let mut client = DirectoryClient::new(store.clone());
        for vdom in ["../outside", "a/b", ".."] {
            let ctx = CallContext {
                vdom: Some(vdom.to_string()),
                ..CallContext::default()
            };
            let err = client
                .update("system/password-policy", "", &object(json!({"status": "enable"})), &ctx)
                .expect_err("rejected");
            assert!(matches!(err, ApiError::InvalidVdom(ref name) if name == vdom));
        }
        assert!(!dir.path().join("outside").exists());
    }

    #[test]
    fn version_file_is_optional() {
        let dir = tempdir().expect("tempdir");
        let mut client = DirectoryClient::new(dir.path());
        assert_eq!(client.device_version().expect("version"), None);

        fs::write(dir.path().join("VERSION"), "v7.2.5 build1517\n").expect("write");
        assert_eq!(
            client.device_version().expect("version"),
            Some(FirmwareVersion::new(7, 2, 5))
        );
    }

    #[test]
    fn keys_with_slashes_round_trip_through_file_names() {
        assert_eq!(encode_key("10.0.0.0/8"), "10.0.0.0%2F8");
        assert_eq!(decode_key(&encode_key("a%2Fb/c")), "a%2Fb/c");
    }
}
