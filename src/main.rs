//! Command-line entry point for the new file monitor.
//!
//! Loads the configuration, takes the baseline, then scans on a fixed
//! interval until Ctrl+C.

use anyhow::Result;
use clap::Parser;
use new_file_monitor::{
    config::MonitorConfig,
    monitor::ScanEngine,
    report::{ConsoleReporterBuilder, EventSink, MpscSink, TracingSink},
    run_monitor_loop, Cli,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("new_file_monitor={level}").parse()?),
        )
        .init();

    let config = cli.monitor_config()?;

    // Handle Ctrl+C gracefully
    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_token.cancel(),
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    // In log mode the loop's own startup log line stands in for the banner.
    if !cli.prints_to_console() {
        monitor(&config, &mut TracingSink, shutdown, false).await;
        return Ok(());
    }

    let (mut sink, rx) = MpscSink::new();
    let mut reporter = ConsoleReporterBuilder::printing().build();
    reporter.listen(rx);

    monitor(&config, &mut sink, shutdown, true).await;

    // Stopped has been sent; let the reporter drain what is left.
    reporter.finished().await;

    Ok(())
}

async fn monitor<S: EventSink>(
    config: &MonitorConfig,
    sink: &mut S,
    shutdown: CancellationToken,
    print_banner: bool,
) {
    let directories = config.watched_directories();
    let mut engine = ScanEngine::with_filesystem();

    engine.initialize(&directories, sink);
    if print_banner {
        println!("Monitoring for new files. Press Ctrl+C to stop.");
    }

    run_monitor_loop(&mut engine, &directories, sink, config.interval(), shutdown).await;
}
