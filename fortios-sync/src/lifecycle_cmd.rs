use std::fs;
use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use fortios_sync::catalog::ResourceType;
use fortios_sync::lifecycle::{create, delete, import, lookup, read, update};
use schema_transcode::write_record;
use tracing::warn;

use crate::cli::{ApplyArgs, DestroyArgs, ImportArgs, ReadArgs};
use crate::session::{load_record, load_state, save_state, Session};

pub fn run_apply(args: ApplyArgs, session: &Session) -> Result<()> {
    let resource = session.resource(&args.resource)?;
    let opts = session.options(&args.device);
    let mut client = session.client(&args.device);

    let mut data = load_state(&args.state)?.unwrap_or_default();
    data.config = load_record(&args.record)?;

    if data.is_tracked() {
        read(&mut client, resource, &mut data, &opts)?;
    }
    let verb = if data.is_tracked() {
        update(&mut client, resource, &mut data, &opts)?;
        "updated"
    } else {
        create(&mut client, resource, &mut data, &opts)?;
        "created"
    };

    save_state(&args.state, &data)?;
    println!(
        "{verb} {} {}",
        resource.name,
        data.id.as_deref().unwrap_or("(gone)")
    );
    Ok(())
}

pub fn run_read(args: ReadArgs, session: &Session) -> Result<()> {
    let resource = session.resource(&args.resource)?;
    let id = object_id(resource, args.id.as_deref())?;
    let opts = session.options(&args.device);
    let mut client = session.client(&args.device);

    let record = lookup(&mut client, resource, id, &opts)?;
    io::stdout().write_all(&write_record(&record)?)?;
    Ok(())
}

pub fn run_import(args: ImportArgs, session: &Session) -> Result<()> {
    let resource = session.resource(&args.resource)?;
    let id = object_id(resource, args.id.as_deref())?;
    if args.state.exists() {
        bail!(
            "refusing to overwrite existing state file {}",
            args.state.display()
        );
    }
    let opts = session.options(&args.device);
    let mut client = session.client(&args.device);

    let data = import(&mut client, resource, id, &opts)?;
    save_state(&args.state, &data)?;
    println!(
        "imported {} {}",
        resource.name,
        data.id.as_deref().unwrap_or(id)
    );
    Ok(())
}

pub fn run_destroy(args: DestroyArgs, session: &Session) -> Result<()> {
    let resource = session.resource(&args.resource)?;
    let Some(mut data) = load_state(&args.state)? else {
        bail!("state file {} does not exist", args.state.display());
    };
    let opts = session.options(&args.device);
    let mut client = session.client(&args.device);

    if !data.is_tracked() {
        warn!(state = %args.state.display(), "state file tracks no object, nothing to delete");
    } else {
        delete(&mut client, resource, &mut data, &opts)?;
    }
    fs::remove_file(&args.state)
        .with_context(|| format!("failed to remove {}", args.state.display()))?;
    println!("destroyed {}", resource.name);
    Ok(())
}

fn object_id<'a>(resource: &'a ResourceType, id: Option<&'a str>) -> Result<&'a str> {
    match (id, resource.singleton) {
        (_, true) => Ok(resource.name.as_str()),
        (Some(id), false) => Ok(id),
        (None, false) => bail!("{} is a table resource; an id is required", resource.name),
    }
}
