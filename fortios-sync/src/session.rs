use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use fortios_sync::catalog::{Catalog, ResourceType};
use fortios_sync::directory_client::DirectoryClient;
use fortios_sync::lifecycle::LifecycleOptions;
use fortios_sync::resource_data::ResourceData;
use fortios_sync::settings::{load_settings_with_source, Settings};
use schema_transcode::{parse_record_file, to_wire_name, Record};
use tracing::debug;

use crate::cli::{Cli, DeviceArgs};

/// Settings and catalog shared by every subcommand.
pub struct Session {
    pub settings: Settings,
    pub catalog: Catalog,
}

impl Session {
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("current_dir")?;
        let (settings, source) = load_settings_with_source(cli.config.as_deref(), &cwd)
            .context("failed to load settings")?;
        debug!(source = %source, "settings loaded");

        let catalog_dir = cli
            .catalog_dir
            .clone()
            .or_else(|| settings.catalog.dir.clone());
        let catalog = match &catalog_dir {
            Some(dir) => Catalog::with_overrides(dir)
                .with_context(|| format!("failed to load catalog from {}", dir.display()))?,
            None => Catalog::embedded().context("failed to load embedded catalog")?,
        };

        Ok(Self { settings, catalog })
    }

    pub fn resource(&self, name: &str) -> Result<&ResourceType> {
        self.catalog.get(name).ok_or_else(|| {
            let known: Vec<_> = self.catalog.names().collect();
            anyhow!(
                "unknown resource type '{name}' (known: {})",
                known.join(", ")
            )
        })
    }

    /// Settings-file options with command-line overrides applied.
    pub fn options(&self, device: &DeviceArgs) -> LifecycleOptions {
        let mut opts = self.settings.lifecycle_options();
        if let Some(vdom) = &device.vdom {
            opts.vdom = Some(vdom.clone());
        }
        if let Some(firmware) = device.firmware {
            opts.firmware_override = Some(firmware);
        }
        if let Some(sort) = device.sort {
            opts.sort = sort.into();
        }
        opts
    }

    /// Offline device with the key field of every table resource registered.
    pub fn client(&self, device: &DeviceArgs) -> DirectoryClient {
        let root = device
            .store
            .clone()
            .unwrap_or_else(|| self.settings.store_dir());
        let mut client = DirectoryClient::new(root);
        for resource in self.catalog.iter() {
            if let Some(mkey) = &resource.mkey {
                client = client.key_field(&resource.path, &to_wire_name(mkey));
            }
        }
        client
    }
}

pub fn load_record(path: &Path) -> Result<Record> {
    parse_record_file(path).with_context(|| format!("failed to parse {}", path.display()))
}

/// Read a state file; `None` when it does not exist yet.
pub fn load_state(path: &Path) -> Result<Option<ResourceData>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let data = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse state file {}", path.display()))?;
    Ok(Some(data))
}

pub fn save_state(path: &Path, data: &ResourceData) -> Result<()> {
    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');
    fs::write(path, json)
        .with_context(|| format!("failed to write state file {}", path.display()))
}
