//! Configuration loading and management
//!
//! Handles parsing of `.trk.toml` configuration files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE: &str = ".trk.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data file configuration
    #[serde(default)]
    pub data: DataConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
        }
    }
}

/// Where the item snapshot lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the JSONL snapshot file
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

fn default_data_path() -> PathBuf {
    PathBuf::from(".trk/items.jsonl")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

impl Config {
    /// Load `.trk.toml` from the given directory, falling back to
    /// defaults when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the data file path: an explicit override wins over the
    /// configured one. Relative paths stay relative to the working
    /// directory.
    pub fn data_path(&self, override_path: Option<PathBuf>) -> PathBuf {
        override_path.unwrap_or_else(|| self.data.path.clone())
    }

    /// Validate the configuration after loading.
    pub fn validate(&self) -> Result<()> {
        if self.data.path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig(
                "data.path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
