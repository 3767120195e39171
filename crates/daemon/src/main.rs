//! kstatd - periodic kernel statistics sampler
//! Writes one JSON record per interval to stdout, logs to stderr

mod config;
mod logging;
mod sink;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use kstat_core::application::{shutdown_channel, Monitor, Sampler};
use kstat_core::port::SystemClock;
use kstat_infra_procfs::ProcfsKernelStats;

use crate::config::DaemonConfig;
use crate::sink::JsonLinesSink;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env().context("Invalid configuration")?;

    // 2. Initialize logging
    let _log_guard = logging::init(config.log_format, config.log_dir.as_deref())?;

    info!("kstatd v{} starting...", VERSION);
    info!(
        proc_root = %config.proc_root.display(),
        watch_pids = ?config.monitor.watch_pids,
        "Configuration loaded"
    );

    // 3. Setup dependencies (DI wiring)
    let kernel = Arc::new(ProcfsKernelStats::with_root(&config.proc_root));
    let clock = Arc::new(SystemClock);
    let sampler = Arc::new(Sampler::new(kernel, clock.clone()));

    match sampler.physical_memory() {
        Ok(bytes) => info!(
            cpus = sampler.number_of_cpus(),
            physical_memory = bytes,
            "Host detected"
        ),
        Err(e) => warn!(error = %e, "Physical memory unavailable"),
    }

    // 4. Start monitor
    let sink = Arc::new(JsonLinesSink::stdout());
    let monitor = Monitor::new(sampler, clock, sink, config.monitor.clone());
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let monitor_handle = tokio::spawn(async move {
        if let Err(e) = monitor.run(shutdown_rx).await {
            error!(error = %e, "Monitor failed");
        }
    });

    info!("Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    wait_for_signal().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 6. Graceful shutdown
    shutdown_tx.shutdown();
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, monitor_handle)
        .await
        .is_err()
    {
        warn!("Monitor did not stop within {:?}", SHUTDOWN_TIMEOUT);
    }

    info!("Shutdown complete.");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl+C")?,
        _ = terminate.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")
}
