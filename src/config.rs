use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::system::CollectorSettings;
use crate::system::disk::DiskFilter;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub cpu: CpuConfig,
    pub disk: DiskConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub format: String,
    pub timeout_ms: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            format: "table".to_string(),
            timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    /// Wait between a baseline and the reported CPU sample; 0 reports
    /// averages since boot.
    pub sample_interval_ms: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    pub exclude_fstypes: Vec<String>,
    pub exclude_mounts: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl Config {
    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            timeout: Duration::from_millis(self.general.timeout_ms),
            disk_filter: DiskFilter {
                exclude_fstypes: self.disk.exclude_fstypes.clone(),
                exclude_mounts: self.disk.exclude_mounts.clone(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostsnap").join("config.toml"))
}

/// Loads the default config file; a missing file yields the defaults.
pub fn load_config() -> Result<Config, ConfigError> {
    match config_path() {
        Some(path) => load_config_from_path(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
