//! Reporting module.
//!
//! This module provides the sinks that receive monitor events and a console
//! reporter that renders them from a channel.

pub mod console;
pub mod sink;

pub use console::{
    ConsoleReporter, ConsoleReporterBuilder, DiscoveredCallback, ReportState, ReporterHandle,
    StoppedCallback, WarningCallback,
};
pub use sink::{BroadcastSink, EventSink, MpscSink, TracingSink};
