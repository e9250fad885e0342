use anyhow::{bail, Context, Result};
use fortios_sync::catalog::ResourceType;
use fortios_sync::client::ApiClient;
use fortios_sync::lifecycle::{managed_fields, read};
use fortios_sync::report::{render_summary, render_text};
use fortios_sync::resource_data::ResourceData;
use schema_transcode::{diff, format_json, validate, Assembler, Record, WireObject};
use serde::Serialize;

use crate::cli::{OutputFormat, PlanArgs};
use crate::session::{load_record, load_state, Session};

#[derive(Debug, Serialize)]
struct PlanReport {
    resource: String,
    action: &'static str,
    id: Option<String>,
    diff: serde_json::Value,
    payload: WireObject,
}

pub fn run_plan(args: PlanArgs, session: &Session) -> Result<()> {
    let resource = session.resource(&args.resource)?;
    let config = load_record(&args.record)?;
    let findings = validate(&config, &resource.schema);
    if !findings.is_empty() {
        bail!(
            "{} is not a valid {} record: {} problem(s); run `validate` for details",
            args.record.display(),
            resource.name,
            findings.len()
        );
    }

    let opts = session.options(&args.device);
    let mut client = session.client(&args.device);
    let mut data = load_state(&args.state)?.unwrap_or_default();
    data.config = config;
    if data.is_tracked() {
        read(&mut client, resource, &mut data, &opts)
            .with_context(|| format!("failed to refresh {}", args.state.display()))?;
    }

    let prior = observed(&data, resource);
    let entries = diff(&prior, &data.config, &resource.schema);
    let action = match (data.is_tracked(), entries.is_empty()) {
        (false, _) => "create",
        (true, true) => "noop",
        (true, false) => "update",
    };

    let firmware = match opts.firmware_override {
        Some(version) => Some(version),
        None => client
            .device_version()
            .context("failed to detect firmware")?,
    };
    let payload = Assembler::new(&resource.schema)
        .firmware(firmware)
        .assemble(&data.snapshot())
        .context("failed to assemble payload")?;

    if args.summary {
        println!("action={action} {}", render_summary(&entries));
        return Ok(());
    }

    match args.format {
        OutputFormat::Text => {
            println!("{} {}: {action}", resource.name, data.id.as_deref().unwrap_or("(new)"));
            if !entries.is_empty() {
                println!("{}", render_text(&entries));
            }
            println!("{}", render_summary(&entries));
        }
        OutputFormat::Json => {
            let report = PlanReport {
                resource: resource.name.clone(),
                action,
                id: data.id.clone(),
                diff: format_json(&entries).context("failed to render diff")?,
                payload,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

/// Device state reduced to the fields this configuration manages, so
/// values the device fills in on its own do not show up as removals.
fn observed(data: &ResourceData, resource: &ResourceType) -> Record {
    let Some(state) = &data.state else {
        return Record::new();
    };
    let managed = managed_fields(resource, state);
    managed
        .iter()
        .filter(|(name, _)| {
            data.config.contains(name)
                || data
                    .applied
                    .as_ref()
                    .is_some_and(|applied| applied.contains(name))
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
