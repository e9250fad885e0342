//! FortiOS resource lifecycle built on descriptor-driven transcoding.
//!
//! This library manages FortiOS CMDB objects (firewall policies, local users,
//! DDNS entries, settings objects and so on) from typed configuration
//! records. Each resource type is described once by a TOML descriptor table;
//! `schema-transcode` turns records into the JSON the device API expects and
//! back, and this crate drives the create/read/update/delete cycle around it.
//!
//! # Architecture
//!
//! ## Resource model
//!
//! - [`catalog`]: Embedded descriptor tables and on-disk overrides
//! - [`resource_data`]: One managed instance: id, planned config, applied
//!   config and last observed state
//!
//! ## Device access
//!
//! - [`client`]: The [`client::ApiClient`] seam and per-call context
//! - [`memory_client`]: In-memory device with call log and fault injection
//! - [`directory_client`]: Offline device stored as JSON files
//!
//! ## Lifecycle
//!
//! - [`lifecycle`]: Create, read, update, delete, import and lookup
//!
//! ## Tooling
//!
//! - [`settings`]: `fortios-sync.toml` loading
//! - [`logging`]: `tracing` subscriber setup for the CLI
//! - [`report`]: Terminal-friendly colored output
//! - [`inspect`]: Descriptor tree visualization
//!
//! # Workflow
//!
//! 1. **Load** the catalog and pick a resource type
//! 2. **Validate** the planned record against its descriptor table
//! 3. **Plan** by diffing the planned record against the last observed state
//! 4. **Apply** with [`lifecycle::create`] or [`lifecycle::update`]
//! 5. **Refresh** with [`lifecycle::read`]; vanished objects drop their id
//!
//! # Examples
//!
//! ```ignore
//! use fortios_sync::catalog::Catalog;
//! use fortios_sync::lifecycle::{create, LifecycleOptions};
//! use fortios_sync::memory_client::MemoryClient;
//! use fortios_sync::resource_data::ResourceData;
//! use schema_transcode::Record;
//!
//! let catalog = Catalog::embedded()?;
//! let user = catalog.get("user_local").expect("known resource");
//! let mut client = MemoryClient::new().key_field("user/local", "name");
//! let mut data = ResourceData::new(Record::new().with("name", "test1"));
//! create(&mut client, user, &mut data, &LifecycleOptions::default())?;
//! assert_eq!(data.id.as_deref(), Some("test1"));
//! ```

pub mod catalog;
pub mod client;
pub mod directory_client;
pub mod inspect;
pub mod lifecycle;
pub mod logging;
pub mod memory_client;
pub mod report;
pub mod resource_data;
pub mod settings;
