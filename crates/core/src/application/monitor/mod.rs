// Monitor - periodic sampling loop

pub mod constants;
mod shutdown;

use constants::*;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::application::Sampler;
use crate::domain::{Pid, ProcessRecord, SampleRecord};
use crate::error::{Result, SampleError};
use crate::port::{Clock, SampleSink};

/// What the monitor samples and how often
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub cpu_window: Duration,
    pub watch_pids: Vec<Pid>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SAMPLE_INTERVAL,
            cpu_window: DEFAULT_CPU_WINDOW,
            watch_pids: Vec::new(),
        }
    }
}

/// Monitor collects one SampleRecord per interval and hands it to a sink
pub struct Monitor {
    sampler: Arc<Sampler>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn SampleSink>,
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(
        sampler: Arc<Sampler>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn SampleSink>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            sampler,
            clock,
            sink,
            config,
        }
    }

    /// Run monitor loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(
            interval_ms = %self.config.interval.as_millis(),
            cpu_window_ms = %self.config.cpu_window.as_millis(),
            watched = self.config.watch_pids.len(),
            "Monitor started"
        );

        let mut cycles: u64 = 0;
        loop {
            if shutdown.is_shutdown() {
                break;
            }

            let started = Instant::now();
            let pause = match self.collect().await {
                Ok(record) => {
                    cycles += 1;
                    if let Err(e) = self.sink.emit(&record) {
                        error!(error = %e, "Failed to emit sample record");
                    }
                    self.config.interval.saturating_sub(started.elapsed())
                }
                Err(e) => {
                    error!(error = %e, "Sampling cycle failed");
                    ERROR_RECOVERY_SLEEP_DURATION
                }
            };

            tokio::select! {
                _ = sleep(pause) => {},
                _ = shutdown.wait() => {
                    info!("Monitor interrupted while waiting");
                    break;
                }
            }
        }

        info!(cycles, "Monitor stopped");
        Ok(())
    }

    /// Take one record on a blocking thread
    ///
    /// The delta CPU sample blocks for the whole window, so the cycle never
    /// runs on the async executor.
    pub async fn collect(&self) -> Result<SampleRecord> {
        let sampler = Arc::clone(&self.sampler);
        let clock = Arc::clone(&self.clock);
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || collect_record(&sampler, clock.as_ref(), &config))
            .await
            .map_err(|e| SampleError::Internal(format!("sampling task failed: {}", e)))?
    }
}

/// Synchronous body of one monitor cycle
///
/// CPU or memory failures fail the cycle. A watched process that cannot be
/// sampled (usually because it exited) is left out of the record.
pub fn collect_record(
    sampler: &Sampler,
    clock: &dyn Clock,
    config: &MonitorConfig,
) -> Result<SampleRecord> {
    let cpu = sampler.delta_sample_cpu_load(config.cpu_window)?;
    let memory = sampler.sample_memory_usage()?;

    let mut processes = Vec::with_capacity(config.watch_pids.len());
    for &pid in &config.watch_pids {
        let sampled = sampler
            .sample_process_cpu_load(pid)
            .and_then(|cpu| Ok((cpu, sampler.sample_process_memory(pid)?)));

        match sampled {
            Ok((cpu, memory)) => processes.push(ProcessRecord { pid, cpu, memory }),
            Err(e) => warn!(pid = %pid, error = %e, "Skipping watched process"),
        }
    }

    Ok(SampleRecord {
        timestamp_ms: clock.now_millis(),
        cpu,
        cpu_busy_percent: cpu.busy_percent(),
        memory,
        processes,
    })
}
