//! Console reporter that listens to monitor events.
//!
//! This module provides `ConsoleReporter` which listens to events from an
//! [`MpscSink`](crate::report::MpscSink) (or, lossily, a
//! [`BroadcastSink`](crate::report::BroadcastSink)) in a background task and
//! hands each one to the configured callbacks.

use crate::monitor::{DiscoveryEvent, MonitorEvent, WatchedDirectory};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Callback for a discovered entry.
pub type DiscoveredCallback = Box<dyn Fn(&DiscoveryEvent) + Send + Sync>;

/// Callback for a missing-directory warning.
pub type WarningCallback = Box<dyn Fn(&WatchedDirectory) + Send + Sync>;

/// Callback for the shutdown acknowledgment.
pub type StoppedCallback = Box<dyn Fn() + Send + Sync>;

/// Counters kept by the reporter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportState {
    /// Discovery events rendered.
    pub discovered: u64,
    /// Warnings rendered.
    pub warnings: u64,
    /// Events lost because the listener fell behind.
    pub lagged: u64,
    /// Whether `Stopped` was received.
    pub stopped: bool,
}

/// Shared handle to the reporter state and callbacks.
#[derive(Clone, Default)]
pub struct ReporterHandle {
    state: Arc<RwLock<ReportState>>,
    discovered_cb: Option<Arc<DiscoveredCallback>>,
    warning_cb: Option<Arc<WarningCallback>>,
    stopped_cb: Option<Arc<StoppedCallback>>,
}

impl ReporterHandle {
    /// Create a handle with no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one event. Returns `false` once the monitor has stopped.
    pub async fn handle(&self, event: &MonitorEvent) -> bool {
        match event {
            MonitorEvent::Discovered(discovery) => {
                self.state.write().await.discovered += 1;
                if let Some(ref cb) = self.discovered_cb {
                    cb(discovery);
                }
                true
            }
            MonitorEvent::Warning(dir) => {
                self.state.write().await.warnings += 1;
                if let Some(ref cb) = self.warning_cb {
                    cb(dir);
                }
                true
            }
            MonitorEvent::Stopped => {
                self.state.write().await.stopped = true;
                if let Some(ref cb) = self.stopped_cb {
                    cb();
                }
                false
            }
        }
    }

    async fn record_lag(&self, count: u64) {
        self.state.write().await.lagged += count;
    }

    /// Snapshot of the counters.
    pub async fn state(&self) -> ReportState {
        self.state.read().await.clone()
    }
}

/// Background listener that renders monitor events.
pub struct ConsoleReporter {
    handle: ReporterHandle,
    listener_handle: Option<tokio::task::JoinHandle<()>>,
}

impl ConsoleReporter {
    /// Create a reporter with no callbacks.
    pub fn new() -> Self {
        Self::with_handle(ReporterHandle::new())
    }

    fn with_handle(handle: ReporterHandle) -> Self {
        Self {
            handle,
            listener_handle: None,
        }
    }

    /// Shared state and callbacks of this reporter.
    pub fn handle(&self) -> &ReporterHandle {
        &self.handle
    }

    /// Start listening for monitor events from an [`MpscSink`](crate::report::MpscSink).
    ///
    /// This spawns a background task that renders every event, in order,
    /// until `Stopped` is received or the channel closes.
    pub fn listen(&mut self, rx: mpsc::UnboundedReceiver<MonitorEvent>) {
        let handle = self.handle.clone();

        let task = tokio::spawn(async move {
            Self::listener_loop(handle, rx).await;
        });

        self.listener_handle = Some(task);
    }

    /// Start listening on a broadcast channel.
    ///
    /// Events overwritten before the listener reaches them are counted in
    /// [`ReportState::lagged`] and never rendered.
    pub fn listen_broadcast(&mut self, rx: broadcast::Receiver<MonitorEvent>) {
        let handle = self.handle.clone();

        let task = tokio::spawn(async move {
            Self::broadcast_listener_loop(handle, rx).await;
        });

        self.listener_handle = Some(task);
    }

    async fn listener_loop(handle: ReporterHandle, mut rx: mpsc::UnboundedReceiver<MonitorEvent>) {
        while let Some(event) = rx.recv().await {
            if !handle.handle(&event).await {
                tracing::debug!("Reporter received stop, exiting listener");
                return;
            }
        }
        tracing::info!("Monitor event channel closed, stopping reporter");
    }

    async fn broadcast_listener_loop(
        handle: ReporterHandle,
        mut rx: broadcast::Receiver<MonitorEvent>,
    ) {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if !handle.handle(&event).await {
                        tracing::debug!("Reporter received stop, exiting listener");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    tracing::warn!("Reporter lagged behind by {} events", count);
                    handle.record_lag(count).await;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Monitor event channel closed, stopping reporter");
                    break;
                }
            }
        }
    }

    /// Wait for the listener to finish on its own.
    pub async fn finished(&mut self) {
        if let Some(task) = self.listener_handle.take() {
            if let Err(e) = task.await {
                tracing::warn!("Reporter task failed: {}", e);
            }
        }
    }

    /// Abort the listener task.
    pub async fn stop(&mut self) {
        if let Some(task) = self.listener_handle.take() {
            task.abort();
            let _ = task.await;
        }
    }

    /// Check if the listener is running.
    pub fn is_listening(&self) -> bool {
        self.listener_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for ConsoleReporter.
#[derive(Default)]
pub struct ConsoleReporterBuilder {
    discovered_cb: Option<DiscoveredCallback>,
    warning_cb: Option<WarningCallback>,
    stopped_cb: Option<StoppedCallback>,
}

impl ConsoleReporterBuilder {
    /// Builder with no callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the callback for discovered entries.
    pub fn on_discovered(mut self, cb: DiscoveredCallback) -> Self {
        self.discovered_cb = Some(cb);
        self
    }

    /// Set the callback for missing-directory warnings.
    pub fn on_warning(mut self, cb: WarningCallback) -> Self {
        self.warning_cb = Some(cb);
        self
    }

    /// Set the callback for the shutdown acknowledgment.
    pub fn on_stopped(mut self, cb: StoppedCallback) -> Self {
        self.stopped_cb = Some(cb);
        self
    }

    /// Build a reporter that prints events to stdout.
    pub fn printing() -> Self {
        Self::new()
            .on_discovered(Box::new(|event| {
                println!("{}", MonitorEvent::Discovered(event.clone()));
            }))
            .on_warning(Box::new(|dir| {
                println!("{}", MonitorEvent::Warning(dir.clone()));
            }))
            .on_stopped(Box::new(|| {
                println!("{}", MonitorEvent::Stopped);
            }))
    }

    /// Build the ConsoleReporter.
    pub fn build(self) -> ConsoleReporter {
        ConsoleReporter::with_handle(ReporterHandle {
            state: Arc::new(RwLock::new(ReportState::default())),
            discovered_cb: self.discovered_cb.map(Arc::new),
            warning_cb: self.warning_cb.map(Arc::new),
            stopped_cb: self.stopped_cb.map(Arc::new),
        })
    }
}
