//! Watched directories and the messages a monitor emits.

use std::fmt;
use std::path::{Path, PathBuf};

/// A directory the monitor polls.
///
/// Identity is the path as configured; no canonicalisation is applied, so
/// `./inbox` and `inbox` are two different watched directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchedDirectory(PathBuf);

impl WatchedDirectory {
    /// Create a watched directory from any path-like value.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The configured path.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for WatchedDirectory {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&str> for WatchedDirectory {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

impl fmt::Display for WatchedDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// An entry name present in the current listing but absent from the
/// previous snapshot of its directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscoveryEvent {
    /// Directory the entry was found in.
    pub directory: WatchedDirectory,
    /// Bare entry name, not a path.
    pub name: String,
}

impl DiscoveryEvent {
    /// Create a discovery for `name` inside `directory`.
    pub fn new(directory: WatchedDirectory, name: impl Into<String>) -> Self {
        Self {
            directory,
            name: name.into(),
        }
    }

    /// Full path of the discovered entry.
    pub fn path(&self) -> PathBuf {
        self.directory.path().join(&self.name)
    }
}

/// Message delivered to an [`EventSink`](crate::report::EventSink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// The directory was missing or unreadable when the baseline was taken.
    Warning(WatchedDirectory),
    /// A new entry was found during a tick.
    Discovered(DiscoveryEvent),
    /// The monitor loop shut down cleanly.
    Stopped,
}

impl fmt::Display for MonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorEvent::Warning(dir) => write!(f, "Warning: Directory {dir} is not available."),
            MonitorEvent::Discovered(event) => {
                write!(f, "New file uploaded: {}", event.path().display())
            }
            MonitorEvent::Stopped => write!(f, "Stopping the monitoring process."),
        }
    }
}
