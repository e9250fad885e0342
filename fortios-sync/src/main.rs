use anyhow::{bail, Context, Result};
use clap::Parser;
use fortios_sync::inspect::render_schema;
use fortios_sync::logging;
use fortios_sync::report::{render_catalog, render_findings};
use schema_transcode::validate;

mod cli;
mod lifecycle_cmd;
mod plan_cmd;
mod session;
mod transcode_cmd;

use cli::{Cli, Command, OutputFormat, SchemaArgs, ValidateArgs};
use session::{load_record, Session};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    let session = Session::load(&cli)?;

    match cli.command {
        Command::Schema(args) => run_schema(args, &session),
        Command::Assemble(args) => transcode_cmd::run_assemble(args, &session),
        Command::Disassemble(args) => transcode_cmd::run_disassemble(args, &session),
        Command::Validate(args) => run_validate(args, &session),
        Command::Plan(args) => plan_cmd::run_plan(args, &session),
        Command::Apply(args) => lifecycle_cmd::run_apply(args, &session),
        Command::Read(args) => lifecycle_cmd::run_read(args, &session),
        Command::Import(args) => lifecycle_cmd::run_import(args, &session),
        Command::Destroy(args) => lifecycle_cmd::run_destroy(args, &session),
    }
}

fn run_schema(args: SchemaArgs, session: &Session) -> Result<()> {
    let Some(name) = &args.resource else {
        match args.format {
            OutputFormat::Text => println!("{}", render_catalog(&session.catalog, args.sources)),
            OutputFormat::Json => {
                let all: Vec<_> = session.catalog.iter().collect();
                println!("{}", serde_json::to_string_pretty(&all)?);
            }
        }
        return Ok(());
    };

    let resource = session.resource(name)?;
    match args.format {
        OutputFormat::Text => print!("{}", render_schema(resource, args.depth)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(resource)?),
    }
    Ok(())
}

fn run_validate(args: ValidateArgs, session: &Session) -> Result<()> {
    let resource = session.resource(&args.resource)?;
    let record = load_record(&args.record)?;
    let findings = validate(&record, &resource.schema);

    match args.format {
        OutputFormat::Text => println!("{}", render_findings(&findings)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&findings).context("failed to encode findings")?
        ),
    }

    if !findings.is_empty() {
        bail!("validate failed: {} problem(s)", findings.len());
    }
    Ok(())
}
