//! Monitor configuration.
//!
//! Example `monitor.toml`:
//! ```toml
//! directories = ["/srv/inbox/structured", "/srv/inbox/unstructured"]
//! interval_secs = 10
//! ```

use crate::monitor::WatchedDirectory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default seconds between ticks.
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

/// Configuration loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        /// Config file path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`MonitorConfig`].
    #[error("Failed to parse TOML config {path}: {source}")]
    ParseToml {
        /// Config file path.
        path: String,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },

    /// Neither the file nor the command line named a directory.
    #[error("No directories to monitor")]
    NoDirectories,

    /// `interval_secs` was zero.
    #[error("Scan interval must be at least one second")]
    ZeroInterval,
}

/// Directories to watch and how often to scan them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Directories to watch, in scan order.
    pub directories: Vec<PathBuf>,
    /// Seconds between ticks.
    pub interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseToml {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Check the configuration and collapse duplicate directories.
    ///
    /// The first occurrence of a repeated directory keeps its position.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let mut seen = HashSet::new();
        self.directories.retain(|dir| {
            let first = seen.insert(dir.clone());
            if !first {
                tracing::warn!("Ignoring duplicate directory {}", dir.display());
            }
            first
        });

        if self.directories.is_empty() {
            return Err(ConfigError::NoDirectories);
        }

        Ok(self)
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Directories as watched-directory handles, in configured order.
    pub fn watched_directories(&self) -> Vec<WatchedDirectory> {
        self.directories
            .iter()
            .cloned()
            .map(WatchedDirectory::from)
            .collect()
    }
}
