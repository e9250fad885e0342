use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use schema_transcode::{FirmwareVersion, SortMode};

#[derive(Parser, Debug)]
#[command(name = "fortios-sync")]
#[command(about = "Transcode and manage FortiOS configuration objects")]
pub struct Cli {
    /// Settings file. Defaults to ./fortios-sync.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Directory of resource descriptor files overriding the embedded ones.
    #[arg(long, global = true)]
    pub catalog_dir: Option<PathBuf>,
    /// Increase diagnostic output (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Only report errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// List resource types, or show the descriptor tree of one.
    Schema(SchemaArgs),
    /// Turn a configuration record into the wire object sent to the device.
    Assemble(AssembleArgs),
    /// Turn a wire object or API response into a configuration record.
    Disassemble(DisassembleArgs),
    /// Check a configuration record against its descriptor table.
    Validate(ValidateArgs),
    /// Show what applying a configuration record would change.
    Plan(PlanArgs),
    /// Create or update a resource from a configuration record.
    Apply(ApplyArgs),
    /// Look up one object on the device.
    Read(ReadArgs),
    /// Adopt an existing object into a state file.
    Import(ImportArgs),
    /// Delete the object tracked by a state file.
    Destroy(DestroyArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum SortArg {
    None,
    Lexical,
    Natural,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::None => SortMode::None,
            SortArg::Lexical => SortMode::Lexical,
            SortArg::Natural => SortMode::Natural,
        }
    }
}

/// Where the device lives and how to talk to it.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DeviceArgs {
    /// Offline device directory. Overrides `[store] dir`.
    #[arg(long)]
    pub store: Option<PathBuf>,
    /// Target VDOM. Overrides `[device] vdom`.
    #[arg(long)]
    pub vdom: Option<String>,
    /// Assume this firmware instead of asking the device.
    #[arg(long)]
    pub firmware: Option<FirmwareVersion>,
    /// Ordering applied to keyed tables read back from the device.
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,
}

#[derive(Parser, Debug)]
pub struct SchemaArgs {
    /// Resource type to show. Lists all resource types when omitted.
    pub resource: Option<String>,
    #[arg(long, default_value_t = 3)]
    pub depth: usize,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Show where each resource type was loaded from.
    #[arg(long)]
    pub sources: bool,
}

#[derive(Parser, Debug)]
pub struct AssembleArgs {
    pub resource: String,
    /// Configuration record (JSON).
    pub record: PathBuf,
    /// Previously applied record; fields missing from RECORD are sent as null.
    #[arg(long)]
    pub prior: Option<PathBuf>,
    /// Send every field as null (settings reset).
    #[arg(long)]
    pub clear: bool,
    #[arg(long)]
    pub firmware: Option<FirmwareVersion>,
}

#[derive(Parser, Debug)]
pub struct DisassembleArgs {
    pub resource: String,
    /// Wire object or API response (JSON).
    pub wire: PathBuf,
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,
    #[arg(long)]
    pub firmware: Option<FirmwareVersion>,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    pub resource: String,
    /// Configuration record (JSON).
    pub record: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct PlanArgs {
    pub resource: String,
    /// Configuration record (JSON).
    pub record: PathBuf,
    /// State file of the resource. Missing means the resource is new.
    #[arg(long)]
    pub state: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Only print change counts.
    #[arg(long)]
    pub summary: bool,
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Parser, Debug)]
pub struct ApplyArgs {
    pub resource: String,
    /// Configuration record (JSON).
    pub record: PathBuf,
    /// State file of the resource; created on first apply.
    #[arg(long)]
    pub state: PathBuf,
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Parser, Debug)]
pub struct ReadArgs {
    pub resource: String,
    /// Object key. Not needed for settings resources.
    pub id: Option<String>,
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    pub resource: String,
    /// Object key. Not needed for settings resources.
    pub id: Option<String>,
    /// State file to write.
    #[arg(long)]
    pub state: PathBuf,
    #[command(flatten)]
    pub device: DeviceArgs,
}

#[derive(Parser, Debug)]
pub struct DestroyArgs {
    pub resource: String,
    /// State file of the resource.
    #[arg(long)]
    pub state: PathBuf,
    #[command(flatten)]
    pub device: DeviceArgs,
}
