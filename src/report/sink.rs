//! Sinks that accept monitor events.

use crate::monitor::MonitorEvent;
use tokio::sync::{broadcast, mpsc};

/// Receiver of [`MonitorEvent`]s.
///
/// The core has no opinion on rendering; a sink may print, log, queue or
/// record the events it is given.
pub trait EventSink {
    /// Accept one event.
    fn emit(&mut self, event: MonitorEvent);
}

impl EventSink for Vec<MonitorEvent> {
    fn emit(&mut self, event: MonitorEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: MonitorEvent) {
        (**self).emit(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: MonitorEvent) {
        (**self).emit(event);
    }
}

/// Sink that writes every event to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: MonitorEvent) {
        match &event {
            MonitorEvent::Warning(dir) => {
                tracing::warn!(directory = %dir, "Watched directory is not available");
            }
            MonitorEvent::Discovered(discovery) => {
                tracing::info!(
                    directory = %discovery.directory,
                    name = %discovery.name,
                    "New file detected"
                );
            }
            MonitorEvent::Stopped => {
                tracing::info!("Monitor stopped");
            }
        }
    }
}

/// Sink that forwards events to a single listener without loss.
///
/// The channel is unbounded so a tick never blocks and a burst of
/// discoveries larger than any buffer is still delivered in full.
#[derive(Debug, Clone)]
pub struct MpscSink {
    sender: mpsc::UnboundedSender<MonitorEvent>,
}

impl MpscSink {
    /// Creates an unbounded sink.
    ///
    /// # Returns
    /// A tuple of (sink, receiver) where receiver gets every emitted event.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MonitorEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for MpscSink {
    fn emit(&mut self, event: MonitorEvent) {
        if let Err(e) = self.sender.send(event) {
            tracing::warn!("Monitor event listener is gone, dropping {:?}", e.0);
        }
    }
}

/// Sink that fans events out to a broadcast channel.
///
/// Lossy: events emitted while nobody is subscribed are dropped, and a
/// subscriber that falls more than `buffer_size` events behind observes
/// `Lagged` and never sees the overwritten events. Use [`MpscSink`] when
/// every discovery must be rendered.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<MonitorEvent>,
}

impl BroadcastSink {
    /// Creates a broadcast sink.
    ///
    /// # Returns
    /// A tuple of (sink, receiver) where receiver gets emitted events while
    /// it keeps up.
    pub fn new(buffer_size: usize) -> (Self, broadcast::Receiver<MonitorEvent>) {
        let (sender, receiver) = broadcast::channel(buffer_size.max(1));
        (Self { sender }, receiver)
    }

    /// Subscribe a new listener.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn emit(&mut self, event: MonitorEvent) {
        if let Err(e) = self.sender.send(event) {
            tracing::debug!("No listeners for monitor event: {:?}", e.0);
        }
    }
}
