//! New File Monitor
//!
//! This crate detects entries newly created in a fixed set of watched
//! directories and reports each one exactly once. Detection is poll-based:
//! every tick lists each directory, diffs the listing against the snapshot
//! from the previous tick, and reports the names that were not there before.
//!
//! ## Flow
//!
//! ```text
//! ScanEngine::initialize()   baseline, no discoveries
//!        ↓
//! run_monitor_loop()         tokio interval, one tick at a time
//!        ↓
//! ScanEngine::tick()         list → diff → replace snapshot
//!        ↓
//! EventSink::emit()          Warning / Discovered / Stopped
//!        ↓
//! ConsoleReporter            renders from an unbounded channel
//! ```
//!
//! Only creation-presence is tracked. Modifications, deletions and renames
//! are not reported, and a directory that vanishes and comes back has all
//! of its entries reported again.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use new_file_monitor::{
//!     monitor::{ScanEngine, WatchedDirectory},
//!     report::{ConsoleReporterBuilder, MpscSink},
//!     run_monitor_loop,
//! };
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let directories = vec![WatchedDirectory::from("/srv/inbox")];
//!
//!     let (mut sink, rx) = MpscSink::new();
//!     let mut reporter = ConsoleReporterBuilder::printing().build();
//!     reporter.listen(rx);
//!
//!     let mut engine = ScanEngine::with_filesystem();
//!     engine.initialize(&directories, &mut sink);
//!
//!     let shutdown = CancellationToken::new();
//!     run_monitor_loop(
//!         &mut engine,
//!         &directories,
//!         &mut sink,
//!         Duration::from_secs(10),
//!         shutdown,
//!     )
//!     .await;
//!
//!     reporter.finished().await;
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`monitor`]: Detection core
//!   - [`monitor::snapshot_store`]: Last seen entry names per directory
//!   - [`monitor::engine`]: The snapshot-diff tick
//!   - [`monitor::listing`]: Filesystem and in-memory listing providers
//! - [`report`]: Event sinks and the console reporter
//! - [`config`]: TOML configuration
//! - [`cli`]: Command-line arguments

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cli;
pub mod config;
pub mod monitor;
pub mod report;

pub use cli::Cli;

use monitor::{DirectoryLister, MonitorEvent, ScanEngine, WatchedDirectory};
use report::EventSink;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Re-exports for convenience.
pub mod prelude {
    pub use crate::config::{ConfigError, MonitorConfig};
    pub use crate::monitor::{
        DirectoryLister, DiscoveryEvent, EntrySet, FsLister, ListingError, MemoryLister,
        MonitorEvent, ScanEngine, SnapshotStore, TickReport, WatchedDirectory,
    };
    pub use crate::report::{
        BroadcastSink, ConsoleReporter, ConsoleReporterBuilder, EventSink, MpscSink, TracingSink,
    };
}

/// Shortest interval [`run_monitor_loop`] will tick at.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Run the monitor loop until `shutdown` is cancelled.
///
/// The engine must already be initialized. The first tick runs immediately,
/// then one tick per `interval`; a tick that overruns delays the next one
/// instead of bunching ticks up. Cancellation is checked between ticks and
/// wins over a due tick. On exit `Stopped` is emitted to `sink`.
///
/// An `interval` shorter than [`MIN_TICK_INTERVAL`] (including zero) is
/// raised to it.
///
/// # Arguments
/// * `engine` - The initialized scan engine
/// * `directories` - Directories to scan on every tick, in order
/// * `sink` - Receiver of discovery events and the final `Stopped`
/// * `interval` - Time between ticks
/// * `shutdown` - Token that ends the loop
pub async fn run_monitor_loop<L, S>(
    engine: &mut ScanEngine<L>,
    directories: &[WatchedDirectory],
    sink: &mut S,
    interval: Duration,
    shutdown: CancellationToken,
) where
    L: DirectoryLister,
    S: EventSink + ?Sized,
{
    if interval < MIN_TICK_INTERVAL {
        tracing::warn!(
            "Tick interval {:?} is too short, using {:?}",
            interval,
            MIN_TICK_INTERVAL
        );
    }
    let interval = interval.max(MIN_TICK_INTERVAL);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        directories = directories.len(),
        interval_secs = interval.as_secs(),
        "Monitoring for new files"
    );

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                break;
            }
            _ = ticker.tick() => {
                let report = engine.tick(directories, sink);
                if report.discovered > 0 {
                    tracing::info!("Detected {} new entries", report.discovered);
                }
            }
        }
    }

    tracing::info!("Stopping the monitoring process");
    sink.emit(MonitorEvent::Stopped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{DiscoveryEvent, MemoryLister};
    use crate::report::{ConsoleReporterBuilder, MpscSink};
    use std::sync::{Arc, Mutex};

    struct CancelOnDiscovery {
        events: Vec<MonitorEvent>,
        token: CancellationToken,
    }

    impl EventSink for CancelOnDiscovery {
        fn emit(&mut self, event: MonitorEvent) {
            if matches!(event, MonitorEvent::Discovered(_)) {
                self.token.cancel();
            }
            self.events.push(event);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_stops_when_already_cancelled() {
        let lister = MemoryLister::new();
        lister.add_entry("/in", "a");
        let dirs = vec![WatchedDirectory::from("/in")];
        let mut engine = ScanEngine::new(lister);

        let token = CancellationToken::new();
        token.cancel();

        let mut events: Vec<MonitorEvent> = Vec::new();
        run_monitor_loop(&mut engine, &dirs, &mut events, Duration::from_secs(10), token).await;

        // Never ticked, so the un-baselined entry was not reported.
        assert_eq!(events, vec![MonitorEvent::Stopped]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_does_not_panic() {
        let lister = MemoryLister::new();
        lister.add_entry("/in", "a");
        let dirs = vec![WatchedDirectory::from("/in")];
        let mut engine = ScanEngine::new(lister.clone());

        let token = CancellationToken::new();
        let mut sink = CancelOnDiscovery {
            events: Vec::new(),
            token: token.clone(),
        };
        engine.initialize(&dirs, &mut sink);
        lister.add_entry("/in", "b");

        run_monitor_loop(&mut engine, &dirs, &mut sink, Duration::ZERO, token).await;

        assert_eq!(
            sink.events,
            vec![
                MonitorEvent::Discovered(DiscoveryEvent::new(dirs[0].clone(), "b")),
                MonitorEvent::Stopped,
            ]
        );
    }

    #[tokio::test]
    async fn test_burst_from_tick_reaches_reporter_in_full() {
        let lister = MemoryLister::new();
        lister.create_dir("/burst");
        let dirs = vec![WatchedDirectory::from("/burst")];
        let mut engine = ScanEngine::new(lister.clone());

        let rendered = Arc::new(Mutex::new(Vec::new()));
        let rendered_cb = Arc::clone(&rendered);
        let mut reporter = ConsoleReporterBuilder::new()
            .on_discovered(Box::new(move |event| {
                rendered_cb.lock().unwrap().push(event.name.clone());
            }))
            .build();

        let (mut sink, rx) = MpscSink::new();
        reporter.listen(rx);

        engine.initialize(&dirs, &mut sink);
        for i in 0..1000 {
            lister.add_entry("/burst", format!("entry-{i:04}"));
        }

        let report = engine.tick(&dirs, &mut sink);
        sink.emit(MonitorEvent::Stopped);
        reporter.finished().await;

        assert_eq!(report.discovered, 1000);
        let state = reporter.handle().state().await;
        assert_eq!(state.discovered, 1000);
        assert_eq!(state.lagged, 0);
        assert!(state.stopped);

        let rendered = rendered.lock().unwrap();
        assert_eq!(rendered.len(), 1000);
        assert_eq!(rendered[0], "entry-0000");
        assert_eq!(rendered[999], "entry-0999");
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_runs_immediately() {
        let lister = MemoryLister::new();
        lister.add_entry("/in", "a.txt");
        let dirs = vec![WatchedDirectory::from("/in")];

        let mut engine = ScanEngine::new(lister.clone());
        let token = CancellationToken::new();
        let mut sink = CancelOnDiscovery {
            events: Vec::new(),
            token: token.clone(),
        };
        engine.initialize(&dirs, &mut sink);

        lister.add_entry("/in", "b.txt");
        run_monitor_loop(&mut engine, &dirs, &mut sink, Duration::from_secs(10), token).await;

        assert_eq!(
            sink.events,
            vec![
                MonitorEvent::Discovered(DiscoveryEvent::new(dirs[0].clone(), "b.txt")),
                MonitorEvent::Stopped,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_created_between_ticks_is_reported_once() {
        let lister = MemoryLister::new();
        lister.create_dir("/in");
        let dirs = vec![WatchedDirectory::from("/in")];

        let mut engine = ScanEngine::new(lister.clone());
        let mut events: Vec<MonitorEvent> = Vec::new();
        engine.initialize(&dirs, &mut events);

        let token = CancellationToken::new();
        let writer = lister.clone();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            writer.add_entry("/in", "late.csv");
            tokio::time::sleep(Duration::from_secs(20)).await;
            canceller.cancel();
        });

        run_monitor_loop(&mut engine, &dirs, &mut events, Duration::from_secs(10), token).await;

        assert_eq!(
            events,
            vec![
                MonitorEvent::Discovered(DiscoveryEvent::new(dirs[0].clone(), "late.csv")),
                MonitorEvent::Stopped,
            ]
        );
        assert_eq!(engine.store().stats().replacements, 4);
    }
}
