use std::fs;
use std::path::{Path, PathBuf};

use schema_transcode::{FirmwareVersion, SortMode};
use serde::Deserialize;
use thiserror::Error;

use crate::lifecycle::LifecycleOptions;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "fortios-sync.toml";
/// Offline device directory used when `[store] dir` is not set.
pub const DEFAULT_STORE_DIR: &str = ".fortios-sync";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub device: DeviceSettings,
    pub transcode: TranscodeSettings,
    pub store: StoreSettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceSettings {
    pub vdom: Option<String>,
    pub retries: u32,
    /// Assume this firmware instead of asking the device.
    pub firmware: Option<FirmwareVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranscodeSettings {
    pub sort: SortMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSettings {
    /// Directory of `<resource>.toml` files overriding the embedded catalog.
    pub dir: Option<PathBuf>,
}

impl Settings {
    pub fn lifecycle_options(&self) -> LifecycleOptions {
        LifecycleOptions {
            vdom: self.device.vdom.clone(),
            retries: self.device.retries,
            sort: self.transcode.sort,
            firmware_override: self.device.firmware,
        }
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
    }
}

/// Errors returned when loading the settings file.
#[derive(Debug, Error)]
pub enum SettingsLoadError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<Settings, SettingsLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| SettingsLoadError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load `explicit`, or `fortios-sync.toml` from `cwd` when present, or fall
/// back to defaults. Also returns where the settings came from.
pub fn load_settings_with_source(
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<(Settings, String), SettingsLoadError> {
    if let Some(path) = explicit {
        return Ok((load_settings(path)?, format!("file:{}", path.display())));
    }

    let candidate = cwd.join(DEFAULT_SETTINGS_FILE);
    if candidate.is_file() {
        return Ok((
            load_settings(&candidate)?,
            format!("file:{}", candidate.display()),
        ));
    }
    Ok((Settings::default(), "defaults".to_string()))
}
