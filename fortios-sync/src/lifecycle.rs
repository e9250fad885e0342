//! Create, read, update and delete for catalog resources.
//!
//! Every operation follows the same shape: detect the firmware once, build
//! a [`CallContext`], transcode with the resource's descriptor table and
//! hand the wire object to the [`ApiClient`]. Create and update finish with
//! a read so `state` always reflects the device.

use std::fmt::{self, Display, Formatter};

use schema_transcode::{
    validate, AssembleMode, Assembler, Disassembler, FirmwareVersion, Record, Snapshot, SortMode,
    TranscodeError, ValidationFinding, WireObject,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::ResourceType;
use crate::client::{render_mkey, ApiClient, ApiError, CallContext};
use crate::resource_data::ResourceData;

/// Settings shared by all lifecycle operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleOptions {
    pub vdom: Option<String>,
    pub retries: u32,
    pub sort: SortMode,
    /// Skip detection and assume this firmware.
    pub firmware_override: Option<FirmwareVersion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Creating,
    Reading,
    Updating,
    Deleting,
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Action::Creating => "creating",
            Action::Reading => "reading",
            Action::Updating => "updating",
            Action::Deleting => "deleting",
        };
        f.write_str(verb)
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Error {action} {resource} resource: {source}")]
    Api {
        action: Action,
        resource: String,
        source: ApiError,
    },
    #[error("Error {action} {resource} resource: {source}")]
    Transcode {
        action: Action,
        resource: String,
        source: TranscodeError,
    },
    #[error("invalid {resource} configuration: {}", summarize(.findings))]
    Invalid {
        resource: String,
        findings: Vec<ValidationFinding>,
    },
    #[error("{resource} resource has no id; create or import it first")]
    MissingId { resource: String },
    #[error("{resource} resource '{id}' not found")]
    NotFound { resource: String, id: String },
}

fn summarize(findings: &[ValidationFinding]) -> String {
    findings
        .iter()
        .map(|finding| format!("{}: {}", finding.path, finding.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Create the resource and store its id, then refresh `state`.
pub fn create(
    client: &mut dyn ApiClient,
    resource: &ResourceType,
    data: &mut ResourceData,
    opts: &LifecycleOptions,
) -> Result<(), LifecycleError> {
    let action = Action::Creating;
    check(resource, &data.config)?;
    let ctx = context(client, resource, opts, action)?;
    let object = assemble(
        resource,
        &Snapshot::fresh(&data.config),
        &ctx,
        action,
        AssembleMode::Normal,
    )?;

    let id = if resource.singleton {
        debug!(resource = %resource.name, "applying settings object");
        client
            .update(&resource.path, "", &object, &ctx)
            .map_err(|source| api_error(action, resource, source))?;
        resource.name.clone()
    } else {
        debug!(resource = %resource.name, fields = object.len(), "creating object");
        let response = client
            .create(&resource.path, &object, &ctx)
            .map_err(|source| api_error(action, resource, source))?;
        match response.get("mkey").and_then(render_mkey) {
            Some(mkey) if !mkey.is_empty() => mkey,
            _ => {
                warn!(
                    resource = %resource.name,
                    "create response carries no mkey, using the resource name"
                );
                resource.name.clone()
            }
        }
    };

    info!(resource = %resource.name, id = %id, "created");
    data.id = Some(id);
    data.applied = Some(data.config.clone());
    refresh(client, resource, data, &ctx, opts.sort)
}

/// Refresh `state` from the device. An object that no longer exists clears
/// the id instead of failing.
pub fn read(
    client: &mut dyn ApiClient,
    resource: &ResourceType,
    data: &mut ResourceData,
    opts: &LifecycleOptions,
) -> Result<(), LifecycleError> {
    let ctx = context(client, resource, opts, Action::Reading)?;
    refresh(client, resource, data, &ctx, opts.sort)
}

/// Push the planned configuration. Fields dropped since the last apply are
/// sent as `null`.
pub fn update(
    client: &mut dyn ApiClient,
    resource: &ResourceType,
    data: &mut ResourceData,
    opts: &LifecycleOptions,
) -> Result<(), LifecycleError> {
    let action = Action::Updating;
    let key = object_key(resource, data)?;
    check(resource, &data.config)?;
    let ctx = context(client, resource, opts, action)?;
    let object = assemble(resource, &data.snapshot(), &ctx, action, AssembleMode::Normal)?;

    debug!(resource = %resource.name, id = %key, fields = object.len(), "updating object");
    client
        .update(&resource.path, &key, &object, &ctx)
        .map_err(|source| api_error(action, resource, source))?;
    data.applied = Some(data.config.clone());
    refresh(client, resource, data, &ctx, opts.sort)
}

/// Remove the resource. Settings objects cannot be removed, so every field
/// is reset to its device default instead.
pub fn delete(
    client: &mut dyn ApiClient,
    resource: &ResourceType,
    data: &mut ResourceData,
    opts: &LifecycleOptions,
) -> Result<(), LifecycleError> {
    let action = Action::Deleting;
    let key = object_key(resource, data)?;
    let ctx = context(client, resource, opts, action)?;

    if resource.singleton {
        let object = assemble(resource, &data.snapshot(), &ctx, action, AssembleMode::Clear)?;
        client
            .update(&resource.path, "", &object, &ctx)
            .map_err(|source| api_error(action, resource, source))?;
    } else {
        client
            .delete(&resource.path, &key, &ctx)
            .map_err(|source| api_error(action, resource, source))?;
    }

    info!(resource = %resource.name, id = %key, "deleted");
    data.clear();
    Ok(())
}

/// Adopt an existing object by id. The managed part of what was read
/// becomes both the configuration and the applied baseline, so fields
/// dropped from the configuration later are cleared on the device.
pub fn import(
    client: &mut dyn ApiClient,
    resource: &ResourceType,
    id: &str,
    opts: &LifecycleOptions,
) -> Result<ResourceData, LifecycleError> {
    let id = if resource.singleton { resource.name.as_str() } else { id };
    let mut data = ResourceData::with_id(id);
    read(client, resource, &mut data, opts)?;
    if !data.is_tracked() {
        return Err(LifecycleError::NotFound {
            resource: resource.name.clone(),
            id: id.to_string(),
        });
    }
    if let Some(state) = &data.state {
        let managed = managed_fields(resource, state);
        data.config = managed.clone();
        data.applied = Some(managed);
    }
    Ok(data)
}

/// Fields the user manages: everything except those the device assigns.
pub fn managed_fields(resource: &ResourceType, record: &Record) -> Record {
    record
        .iter()
        .filter(|(name, _)| {
            resource
                .schema
                .field(name)
                .map_or(true, |field| !field.computed)
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Read-only lookup of one object; a missing object is an error.
pub fn lookup(
    client: &mut dyn ApiClient,
    resource: &ResourceType,
    key: &str,
    opts: &LifecycleOptions,
) -> Result<Record, LifecycleError> {
    let data = import(client, resource, key, opts)?;
    Ok(data.state.unwrap_or_default())
}

fn refresh(
    client: &mut dyn ApiClient,
    resource: &ResourceType,
    data: &mut ResourceData,
    ctx: &CallContext,
    sort: SortMode,
) -> Result<(), LifecycleError> {
    let action = Action::Reading;
    let key = object_key(resource, data)?;
    let fetched = client
        .read(&resource.path, &key, ctx)
        .map_err(|source| api_error(action, resource, source))?;

    let Some(wire) = fetched else {
        warn!(
            resource = %resource.name,
            id = %key,
            "object not found on device, removing it from state"
        );
        data.clear();
        return Ok(());
    };

    let record = Disassembler::new(&resource.schema)
        .sort(sort)
        .firmware(ctx.firmware)
        .disassemble(&wire)
        .map_err(|source| transcode_error(action, resource, source))?;
    data.state = Some(record);
    Ok(())
}

fn context(
    client: &mut dyn ApiClient,
    resource: &ResourceType,
    opts: &LifecycleOptions,
    action: Action,
) -> Result<CallContext, LifecycleError> {
    let firmware = match opts.firmware_override {
        Some(version) => Some(version),
        None => client
            .device_version()
            .map_err(|source| api_error(action, resource, source))?,
    };
    if firmware.is_none() {
        debug!(resource = %resource.name, "firmware unknown, assuming every field is supported");
    }
    Ok(CallContext {
        vdom: opts.vdom.clone(),
        retries: opts.retries,
        firmware,
    })
}

fn assemble(
    resource: &ResourceType,
    snapshot: &Snapshot<'_>,
    ctx: &CallContext,
    action: Action,
    mode: AssembleMode,
) -> Result<WireObject, LifecycleError> {
    Assembler::new(&resource.schema)
        .mode(mode)
        .firmware(ctx.firmware)
        .assemble(snapshot)
        .map_err(|source| transcode_error(action, resource, source))
}

fn check(resource: &ResourceType, config: &Record) -> Result<(), LifecycleError> {
    let findings = validate(config, &resource.schema);
    if findings.is_empty() {
        Ok(())
    } else {
        Err(LifecycleError::Invalid {
            resource: resource.name.clone(),
            findings,
        })
    }
}

// Singletons are addressed with an empty key whatever id they carry.
fn object_key(resource: &ResourceType, data: &ResourceData) -> Result<String, LifecycleError> {
    match &data.id {
        Some(_) if resource.singleton => Ok(String::new()),
        Some(id) => Ok(id.clone()),
        None => Err(LifecycleError::MissingId {
            resource: resource.name.clone(),
        }),
    }
}

fn api_error(action: Action, resource: &ResourceType, source: ApiError) -> LifecycleError {
    LifecycleError::Api {
        action,
        resource: resource.name.clone(),
        source,
    }
}

fn transcode_error(
    action: Action,
    resource: &ResourceType,
    source: TranscodeError,
) -> LifecycleError {
    LifecycleError::Transcode {
        action,
        resource: resource.name.clone(),
        source,
    }
}
