//! One detection pass across all watched directories.
//!
//! Each [`ScanEngine::tick`] lists every directory, diffs the listing
//! against the stored snapshot, replaces the snapshot and reports the
//! difference. Ticks are synchronous and must never overlap; the caller
//! owns the schedule.

use crate::monitor::event::{DiscoveryEvent, MonitorEvent, WatchedDirectory};
use crate::monitor::listing::{DirectoryLister, EntrySet, FsLister};
use crate::monitor::snapshot_store::SnapshotStore;
use crate::report::EventSink;

/// Summary of a single tick, for logging.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Directories visited.
    pub scanned: usize,
    /// Discovery events emitted.
    pub discovered: usize,
    /// Directories that were missing or could not be listed.
    pub unavailable: usize,
}

/// Snapshot-diff scanner.
///
/// Owns its [`SnapshotStore`] and listing provider, so independent engines
/// never share state.
#[derive(Debug)]
pub struct ScanEngine<L = FsLister> {
    lister: L,
    store: SnapshotStore,
}

impl ScanEngine<FsLister> {
    /// Engine over the local filesystem.
    pub fn with_filesystem() -> Self {
        Self::new(FsLister::new())
    }
}

impl<L: DirectoryLister> ScanEngine<L> {
    /// Creates an engine with an empty snapshot store.
    pub fn new(lister: L) -> Self {
        Self {
            lister,
            store: SnapshotStore::new(),
        }
    }

    /// Read-only view of the snapshots.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Take the baseline for `directories` without reporting discoveries.
    ///
    /// See [`SnapshotStore::initialize`].
    pub fn initialize<S>(&mut self, directories: &[WatchedDirectory], sink: &mut S)
    where
        S: EventSink + ?Sized,
    {
        self.store.initialize(directories, &self.lister, sink);
        tracing::debug!("{}", self.store.debug_summary());
    }

    /// Run one detection pass.
    ///
    /// For each directory in order: list it (missing or unreadable counts
    /// as empty), compute `current - previous`, store `current` as the new
    /// snapshot, then emit one [`MonitorEvent::Discovered`] per new name in
    /// sorted order.
    ///
    /// A directory that disappears resets to an empty snapshot, so its
    /// entries are all reported again if it comes back. Missing directories
    /// are only warned about by [`ScanEngine::initialize`], never here.
    pub fn tick<S>(&mut self, directories: &[WatchedDirectory], sink: &mut S) -> TickReport
    where
        S: EventSink + ?Sized,
    {
        let mut report = TickReport::default();

        for directory in directories {
            let current = match self.lister.list(directory.path()) {
                Ok(Some(names)) => names,
                Ok(None) => {
                    report.unavailable += 1;
                    EntrySet::new()
                }
                Err(e) => {
                    tracing::warn!(directory = %directory, error = %e, "Failed to list directory");
                    report.unavailable += 1;
                    EntrySet::new()
                }
            };

            let previous = self.store.get(directory);
            let new_names: Vec<String> = current.difference(&previous).cloned().collect();

            self.store.set(directory, current);

            for name in new_names {
                sink.emit(MonitorEvent::Discovered(DiscoveryEvent::new(
                    directory.clone(),
                    name,
                )));
                report.discovered += 1;
            }

            report.scanned += 1;
        }

        tracing::debug!(
            scanned = report.scanned,
            discovered = report.discovered,
            unavailable = report.unavailable,
            "Tick complete"
        );

        report
    }
}
