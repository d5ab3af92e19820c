//! Command-line arguments.

use crate::config::{ConfigError, MonitorConfig};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments of the monitor binary.
#[derive(Parser, Debug)]
#[command(
    name = "new-file-monitor",
    version,
    about = "Report files newly created in a set of directories",
    long_about = "new-file-monitor polls a fixed set of directories and prints every entry that was not present on the previous scan."
)]
pub struct Cli {
    /// Directories to monitor (added after any from --config)
    pub directories: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds between scans (overrides the config file)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Report events through the log instead of printing them
    #[arg(long)]
    pub log: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Merge the config file (if any) with command-line overrides.
    pub fn monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        let mut config = match self.config {
            Some(ref path) => MonitorConfig::from_file(path)?,
            None => MonitorConfig::default(),
        };

        config.directories.extend(self.directories.iter().cloned());
        if let Some(interval) = self.interval {
            config.interval_secs = interval;
        }

        config.validated()
    }

    /// Whether events and the startup banner go to stdout.
    ///
    /// With `--log` everything goes through `tracing` instead.
    pub fn prints_to_console(&self) -> bool {
        !self.log
    }
}
