//! Per-directory record of previously seen entry names.
//!
//! `SnapshotStore` is the authoritative answer to "which names were already
//! present the last time this directory was looked at?". It is owned by a
//! single [`ScanEngine`](crate::monitor::ScanEngine); there is no shared or
//! static snapshot state.

use crate::monitor::event::{MonitorEvent, WatchedDirectory};
use crate::monitor::listing::{DirectoryLister, EntrySet};
use crate::report::EventSink;
use std::collections::HashMap;

/// Counters about snapshot activity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SnapshotStats {
    /// Directories baselined by [`SnapshotStore::initialize`].
    pub baselines: u64,
    /// Directories that were unavailable when baselined.
    pub missing_at_baseline: u64,
    /// Snapshot replacements via [`SnapshotStore::set`].
    pub replacements: u64,
}

/// Last observed entry-name set for each watched directory.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<WatchedDirectory, EntrySet>,
    stats: SnapshotStats,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the baseline for every directory.
    ///
    /// Existing directories store their current names and emit nothing. A
    /// directory that does not exist (or cannot be listed) stores the empty
    /// set and emits one [`MonitorEvent::Warning`]. Call once at startup.
    pub fn initialize<L, S>(&mut self, directories: &[WatchedDirectory], lister: &L, sink: &mut S)
    where
        L: DirectoryLister + ?Sized,
        S: EventSink + ?Sized,
    {
        for directory in directories {
            let names = match lister.list(directory.path()) {
                Ok(Some(names)) => {
                    tracing::debug!(
                        directory = %directory,
                        entries = names.len(),
                        "Baseline taken"
                    );
                    names
                }
                Ok(None) => {
                    self.stats.missing_at_baseline += 1;
                    sink.emit(MonitorEvent::Warning(directory.clone()));
                    EntrySet::new()
                }
                Err(e) => {
                    tracing::warn!(directory = %directory, error = %e, "Failed to list directory");
                    self.stats.missing_at_baseline += 1;
                    sink.emit(MonitorEvent::Warning(directory.clone()));
                    EntrySet::new()
                }
            };

            self.snapshots.insert(directory.clone(), names);
            self.stats.baselines += 1;
        }
    }

    /// The last stored names, or the empty set for an unknown directory.
    pub fn get(&self, directory: &WatchedDirectory) -> EntrySet {
        self.snapshots.get(directory).cloned().unwrap_or_default()
    }

    /// Replace the stored names for `directory`.
    pub fn set(&mut self, directory: &WatchedDirectory, names: EntrySet) {
        self.snapshots.insert(directory.clone(), names);
        self.stats.replacements += 1;
    }

    /// Whether a snapshot exists for `directory`.
    pub fn contains(&self, directory: &WatchedDirectory) -> bool {
        self.snapshots.contains_key(directory)
    }

    /// Number of directories with a snapshot.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no snapshot has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Directories that currently have a snapshot.
    pub fn directories(&self) -> impl Iterator<Item = &WatchedDirectory> {
        self.snapshots.keys()
    }

    /// Get the current statistics.
    pub fn stats(&self) -> &SnapshotStats {
        &self.stats
    }

    /// Get a summary of the store for debugging.
    pub fn debug_summary(&self) -> String {
        let entries: usize = self.snapshots.values().map(|names| names.len()).sum();
        format!(
            "SnapshotStore: {} directories, {} entries, stats: {:?}",
            self.snapshots.len(),
            entries,
            self.stats
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::listing::{FsLister, MemoryLister};
    use std::fs;
    use tempfile::tempdir;

    fn names(list: &[&str]) -> EntrySet {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_initialize_baselines_existing_directory_silently() {
        let lister = MemoryLister::new();
        lister.add_entry("/in", "a.txt");
        lister.add_entry("/in", "b.txt");
        let dir = WatchedDirectory::from("/in");

        let mut store = SnapshotStore::new();
        let mut events: Vec<MonitorEvent> = Vec::new();
        store.initialize(&[dir.clone()], &lister, &mut events);

        assert!(events.is_empty());
        assert_eq!(store.get(&dir), names(&["a.txt", "b.txt"]));
        assert_eq!(store.stats().baselines, 1);
    }

    #[test]
    fn test_initialize_missing_directory_warns_and_stores_empty() {
        let lister = MemoryLister::new();
        let dir = WatchedDirectory::from("/gone");

        let mut store = SnapshotStore::new();
        let mut events: Vec<MonitorEvent> = Vec::new();
        store.initialize(&[dir.clone()], &lister, &mut events);

        assert_eq!(events, vec![MonitorEvent::Warning(dir.clone())]);
        assert!(store.contains(&dir));
        assert!(store.get(&dir).is_empty());
        assert_eq!(store.stats().missing_at_baseline, 1);
    }

    #[test]
    fn test_initialize_unreadable_directory_warns() {
        let lister = MemoryLister::new();
        lister.add_entry("/locked", "x");
        lister.deny("/locked");
        let dir = WatchedDirectory::from("/locked");

        let mut store = SnapshotStore::new();
        let mut events: Vec<MonitorEvent> = Vec::new();
        store.initialize(&[dir.clone()], &lister, &mut events);

        assert_eq!(events, vec![MonitorEvent::Warning(dir.clone())]);
        assert_eq!(
            events[0].to_string(),
            "Warning: Directory /locked is not available."
        );
        assert!(store.get(&dir).is_empty());
    }

    #[test]
    fn test_every_configured_directory_has_a_snapshot() {
        let lister = MemoryLister::new();
        lister.create_dir("/a");
        let dirs = vec![
            WatchedDirectory::from("/a"),
            WatchedDirectory::from("/b"),
            WatchedDirectory::from("/c"),
        ];

        let mut store = SnapshotStore::new();
        store.initialize(&dirs, &lister, &mut Vec::<MonitorEvent>::new());

        assert_eq!(store.len(), 3);
        assert_eq!(store.directories().count(), 3);
        for dir in &dirs {
            assert!(store.contains(dir));
        }
    }

    #[test]
    fn test_get_unknown_directory_is_empty() {
        let store = SnapshotStore::new();
        assert!(store.is_empty());
        assert!(store.get(&WatchedDirectory::from("/never")).is_empty());
    }

    #[test]
    fn test_set_overwrites_instead_of_merging() {
        let dir = WatchedDirectory::from("/in");
        let mut store = SnapshotStore::new();

        store.set(&dir, names(&["a", "b"]));
        store.set(&dir, names(&["c"]));

        assert_eq!(store.get(&dir), names(&["c"]));
        assert_eq!(store.stats().replacements, 2);
    }

    #[test]
    fn test_initialize_from_real_directory() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("existing.csv"), "1,2").unwrap();
        let dir = WatchedDirectory::new(temp.path());

        let mut store = SnapshotStore::new();
        let mut events: Vec<MonitorEvent> = Vec::new();
        store.initialize(&[dir.clone()], &FsLister::new(), &mut events);

        assert!(events.is_empty());
        assert_eq!(store.get(&dir), names(&["existing.csv"]));
        assert!(store.debug_summary().contains("1 directories"));
    }
}
