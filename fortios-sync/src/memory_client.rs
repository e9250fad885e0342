use std::collections::BTreeMap;

use schema_transcode::{FirmwareVersion, WireObject};
use serde::Serialize;

use crate::client::{
    merge_update, mkey_response, ApiAction, ApiClient, ApiError, CallContext, KeyFields,
};

/// One call observed by [`MemoryClient`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiCall {
    pub action: ApiAction,
    pub path: String,
    pub mkey: Option<String>,
    pub vdom: Option<String>,
    pub body: Option<WireObject>,
}

#[derive(Debug, Clone)]
struct Fault {
    action: ApiAction,
    status: u16,
    message: String,
}

type Table = BTreeMap<String, WireObject>;

/// In-memory device that records every call.
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    version: Option<FirmwareVersion>,
    keys: KeyFields,
    tables: BTreeMap<(String, String), Table>,
    calls: Vec<ApiCall>,
    faults: Vec<Fault>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: FirmwareVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Declare the wire field carrying the key of entries under `path`.
    pub fn key_field(mut self, path: &str, wire_field: &str) -> Self {
        self.keys.insert(path, wire_field);
        self
    }

    /// Make the next `action` call fail with `status`.
    pub fn fail_next(&mut self, action: ApiAction, status: u16, message: impl Into<String>) {
        self.faults.push(Fault {
            action,
            status,
            message: message.into(),
        });
    }

    /// Store an object directly, bypassing the call log.
    pub fn seed(&mut self, vdom: &str, path: &str, mkey: &str, object: WireObject) {
        self.table_mut(vdom, path).insert(mkey.to_string(), object);
    }

    /// Stored object, bypassing the call log.
    pub fn object(&self, vdom: &str, path: &str, mkey: &str) -> Option<&WireObject> {
        self.tables
            .get(&(vdom.to_string(), path.to_string()))
            .and_then(|table| table.get(mkey))
    }

    pub fn calls(&self) -> &[ApiCall] {
        &self.calls
    }

    /// Body of the most recent call of `action`.
    pub fn last_body(&self, action: ApiAction) -> Option<&WireObject> {
        self.calls
            .iter()
            .rev()
            .find(|call| call.action == action)
            .and_then(|call| call.body.as_ref())
    }

    fn record(
        &mut self,
        action: ApiAction,
        path: &str,
        mkey: Option<&str>,
        ctx: Option<&CallContext>,
        body: Option<&WireObject>,
    ) -> Result<(), ApiError> {
        self.calls.push(ApiCall {
            action,
            path: path.to_string(),
            mkey: mkey.map(str::to_string),
            vdom: ctx.and_then(|ctx| ctx.vdom.clone()),
            body: body.cloned(),
        });

        if let Some(pos) = self.faults.iter().position(|fault| fault.action == action) {
            let fault = self.faults.remove(pos);
            return Err(ApiError::Http {
                status: fault.status,
                message: fault.message,
            });
        }
        Ok(())
    }

    fn table_mut(&mut self, vdom: &str, path: &str) -> &mut Table {
        self.tables
            .entry((vdom.to_string(), path.to_string()))
            .or_default()
    }
}

impl ApiClient for MemoryClient {
    fn device_version(&mut self) -> Result<Option<FirmwareVersion>, ApiError> {
        self.record(ApiAction::Version, "", None, None, None)?;
        Ok(self.version)
    }

    fn create(
        &mut self,
        path: &str,
        object: &WireObject,
        ctx: &CallContext,
    ) -> Result<WireObject, ApiError> {
        self.record(ApiAction::Create, path, None, Some(ctx), Some(object))?;

        let mut stored = WireObject::new();
        merge_update(&mut stored, object);
        let keys = self.keys.clone();
        let table = self.table_mut(ctx.vdom_or_default(), path);
        let mkey = keys.assign(path, &mut stored, table.keys().map(String::as_str));
        if table.contains_key(&mkey) {
            return Err(ApiError::Http {
                status: 500,
                message: format!("{path} entry '{mkey}' already exists"),
            });
        }
        table.insert(mkey.clone(), stored);
        Ok(mkey_response(&mkey))
    }

    fn read(
        &mut self,
        path: &str,
        mkey: &str,
        ctx: &CallContext,
    ) -> Result<Option<WireObject>, ApiError> {
        self.record(ApiAction::Read, path, Some(mkey), Some(ctx), None)?;
        Ok(self.object(ctx.vdom_or_default(), path, mkey).cloned())
    }

    fn update(
        &mut self,
        path: &str,
        mkey: &str,
        object: &WireObject,
        ctx: &CallContext,
    ) -> Result<WireObject, ApiError> {
        self.record(ApiAction::Update, path, Some(mkey), Some(ctx), Some(object))?;

        let table = self.table_mut(ctx.vdom_or_default(), path);
        match table.get_mut(mkey) {
            Some(stored) => merge_update(stored, object),
            // Settings objects always exist on a device.
            None if mkey.is_empty() => {
                let mut stored = WireObject::new();
                merge_update(&mut stored, object);
                table.insert(String::new(), stored);
            }
            None => return Err(ApiError::not_found(path, mkey)),
        }
        Ok(mkey_response(mkey))
    }

    fn delete(&mut self, path: &str, mkey: &str, ctx: &CallContext) -> Result<(), ApiError> {
        self.record(ApiAction::Delete, path, Some(mkey), Some(ctx), None)?;
        self.table_mut(ctx.vdom_or_default(), path)
            .remove(mkey)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(path, mkey))
    }
}
