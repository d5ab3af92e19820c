//! Snapshot-diff detection core.
//!
//! This module provides:
//! - `event`: watched directories and the messages sent to a sink
//! - `listing`: directory listing providers (filesystem and in-memory)
//! - `snapshot_store`: last seen entry names per directory
//! - `engine`: the tick that turns listings into discovery events

pub mod engine;
pub mod event;
pub mod listing;
pub mod snapshot_store;

pub use engine::{ScanEngine, TickReport};
pub use event::{DiscoveryEvent, MonitorEvent, WatchedDirectory};
pub use listing::{DirectoryLister, EntrySet, FsLister, ListingError, MemoryLister};
pub use snapshot_store::{SnapshotStats, SnapshotStore};
