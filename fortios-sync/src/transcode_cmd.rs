use std::fs;
use std::io::{self, Write};

use anyhow::{anyhow, Context, Result};
use schema_transcode::{
    parse_response, write_record, AssembleMode, Assembler, Disassembler, Snapshot,
};

use crate::cli::{AssembleArgs, DisassembleArgs};
use crate::session::{load_record, Session};

pub fn run_assemble(args: AssembleArgs, session: &Session) -> Result<()> {
    let resource = session.resource(&args.resource)?;
    let record = load_record(&args.record)?;
    let prior = args.prior.as_deref().map(load_record).transpose()?;

    let mode = if args.clear {
        AssembleMode::Clear
    } else {
        AssembleMode::Normal
    };
    let firmware = args.firmware.or(session.settings.device.firmware);
    let wire = Assembler::new(&resource.schema)
        .mode(mode)
        .firmware(firmware)
        .assemble(&Snapshot::new(&record, prior.as_ref()))
        .with_context(|| format!("failed to assemble {}", args.record.display()))?;

    println!("{}", serde_json::to_string_pretty(&wire)?);
    Ok(())
}

pub fn run_disassemble(args: DisassembleArgs, session: &Session) -> Result<()> {
    let resource = session.resource(&args.resource)?;
    let raw = fs::read(&args.wire)
        .with_context(|| format!("failed to read {}", args.wire.display()))?;
    let wire = parse_response(&raw)
        .with_context(|| format!("failed to parse {}", args.wire.display()))?
        .ok_or_else(|| anyhow!("{} holds an empty result set", args.wire.display()))?;

    let sort = args
        .sort
        .map(Into::into)
        .unwrap_or(session.settings.transcode.sort);
    let firmware = args.firmware.or(session.settings.device.firmware);
    let record = Disassembler::new(&resource.schema)
        .sort(sort)
        .firmware(firmware)
        .disassemble(&wire)
        .with_context(|| format!("failed to disassemble {}", args.wire.display()))?;

    io::stdout().write_all(&write_record(&record)?)?;
    Ok(())
}
