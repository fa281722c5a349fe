//! Configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

const APP_NAME: &str = "tasklist";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Storage configuration
    pub storage: StorageConfig,
}

/// Where the task collection is kept
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `tasks.json`
    #[serde(rename = "data-dir")]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration with fallback chain.
    ///
    /// An explicit path must load; otherwise `./.tasklist.yml`, then
    /// `<config_dir>/tasklist/tasklist.yml`, then defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let candidates = std::iter::once(PathBuf::from(format!(".{}.yml", APP_NAME)))
            .chain(dirs::config_dir().map(|dir| dir.join(APP_NAME).join(format!("{}.yml", APP_NAME))));

        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => warn!("Failed to load config from {}: {}", path.display(), e),
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Data directory, falling back to `<data_local_dir>/tasklist`
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// Per-user application directory under the platform's local data dir
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}
