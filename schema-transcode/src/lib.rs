//! Descriptor-driven transcoding between untyped JSON wire objects and typed
//! configuration records.
//!
//! A [`RecordSchema`] describes one record type. The [`Assembler`] walks it
//! to turn configuration state into the JSON object a REST API expects, and
//! the [`Disassembler`] walks it the other way. Nested tables, single-object
//! blocks, numeric coercion, firmware-dependent fields and "clear on
//! removal" semantics are handled once here instead of per record type.

pub mod capability;
pub mod coerce;
pub mod descriptor;
pub mod diff;
pub mod error;
pub mod format;
pub mod parser;
pub mod path;
pub mod record;
pub mod state;
pub mod transcode;
pub mod validate;
pub mod version;
pub mod writer;

/// JSON object exchanged with the device API.
pub type WireObject = serde_json::Map<String, serde_json::Value>;

pub use capability::CapabilityTable;
pub use descriptor::{FieldDescriptor, FieldType, RecordSchema};
pub use diff::{diff, diff_with_options, DiffEntry, DiffOptions};
pub use error::TranscodeError;
pub use format::{format_json, format_summary, format_text, DiffCounts};
pub use parser::{
    parse_record, parse_record_file, parse_response, parse_wire, parse_wire_file, ParseError,
};
pub use path::{from_wire_name, to_wire_name, FieldPath, PathSegment};
pub use record::{FieldValue, Record};
pub use state::{ConfigState, Snapshot};
pub use transcode::{AssembleMode, Assembler, Disassembler, SortMode};
pub use validate::{validate, ValidationFinding};
pub use version::{FirmwareVersion, VersionParseError, VersionRange};
pub use writer::{write_record, write_wire, write_wire_file, WriteError};
