// Sampler - point-in-time and delta samples over a KernelStats source

use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::{
    units::ticks_to_duration, CpuSample, CpuTimes, MemorySample, Pid, ProcessCpuSample,
    ProcessMemorySample, SwapUsage, Task,
};
use crate::error::Result;
use crate::port::{Clock, KernelStats};

/// Shapes raw kernel counters into samples
///
/// Every call goes straight to the kernel. The only remembered value is the
/// installed physical memory, looked up on first use.
pub struct Sampler {
    kernel: Arc<dyn KernelStats>,
    clock: Arc<dyn Clock>,
    physical_memory: OnceLock<u64>,
}

impl Sampler {
    /// Create a new sampler
    ///
    /// # Example
    /// ```ignore
    /// let sampler = Sampler::new(Arc::new(ProcfsKernelStats::new()), Arc::new(SystemClock));
    /// let cpu = sampler.delta_sample_cpu_load(Duration::from_millis(500))?;
    /// ```
    pub fn new(kernel: Arc<dyn KernelStats>, clock: Arc<dyn Clock>) -> Self {
        Self {
            kernel,
            clock,
            physical_memory: OnceLock::new(),
        }
    }

    /// Cumulative CPU ticks since boot
    pub fn sample_cpu_load(&self) -> Result<CpuSample> {
        let ticks = self.kernel.cpu_ticks()?;
        Ok(CpuSample::from_ticks(&ticks))
    }

    /// CPU ticks spent during `window`
    ///
    /// Blocks the calling thread for `window`. Either sample failing aborts
    /// the delta with that error.
    pub fn delta_sample_cpu_load(&self, window: Duration) -> Result<CpuSample> {
        let first = self.sample_cpu_load()?;
        self.clock.sleep(window);
        let second = self.sample_cpu_load()?;

        let delta = first.delta(&second);
        debug!(
            window_ms = %window.as_millis(),
            user = delta.total_user_time,
            system = delta.total_system_time,
            idle = delta.total_idle_time,
            "Delta CPU sample collected"
        );
        Ok(delta)
    }

    /// Convert a CPU sample from ticks to wall time
    pub fn cpu_times(&self, sample: &CpuSample) -> Result<CpuTimes> {
        let hz = self.kernel.clock_ticks_per_second()?;
        Ok(sample.to_times(hz))
    }

    /// Point-in-time memory and swap usage
    pub fn sample_memory_usage(&self) -> Result<MemorySample> {
        let physical = self.cached_physical_memory()?;
        let vm = self.kernel.vm_statistics()?;
        let swap = self.kernel.swap_usage()?;

        let sample = MemorySample::compose(physical, &vm, &swap);
        debug!(
            used = sample.memory_used,
            free = sample.memory_free,
            pagedout = sample.memory_pagedout,
            "Memory sample collected"
        );
        Ok(sample)
    }

    /// Installed physical memory, in bytes
    pub fn physical_memory(&self) -> Result<u64> {
        self.kernel.physical_memory()
    }

    /// Swap space usage
    pub fn swap_stat(&self) -> Result<SwapUsage> {
        self.kernel.swap_usage()
    }

    /// Total CPU time of every non-idle thread of `pid`
    ///
    /// Threads that exit or cannot be read mid-walk are skipped but still
    /// counted in `thread_count`.
    pub fn sample_process_cpu_load(&self, pid: Pid) -> Result<ProcessCpuSample> {
        let task = self.task_for_pid(pid)?;
        let threads = self.kernel.task_threads(&task)?;
        let hz = self.kernel.clock_ticks_per_second()?;

        let mut ticks: u64 = 0;
        for &thread in &threads {
            let info = match self.kernel.thread_info(&task, thread) {
                Ok(info) => info,
                Err(e) => {
                    debug!(pid = %pid, thread, error = %e, "Skipping unreadable thread");
                    continue;
                }
            };

            if !info.idle {
                ticks = ticks
                    .saturating_add(info.user_time)
                    .saturating_add(info.system_time);
            }
        }

        Ok(ProcessCpuSample {
            total_time: ticks_to_duration(ticks, hz),
            thread_count: u32::try_from(threads.len()).unwrap_or(u32::MAX),
        })
    }

    /// Virtual, resident and shared size of `pid`
    pub fn sample_process_memory(&self, pid: Pid) -> Result<ProcessMemorySample> {
        let task = self.task_for_pid(pid)?;
        let pages = self.kernel.process_memory(&task)?;
        Ok(pages.into())
    }

    /// Online CPUs, never less than one
    pub fn number_of_cpus(&self) -> u32 {
        match self.kernel.cpu_count() {
            Ok(n) => n.max(1),
            Err(e) => {
                warn!(error = %e, "CPU count unavailable, assuming 1");
                1
            }
        }
    }

    /// Open a handle on a live process
    pub fn task_for_pid(&self, pid: Pid) -> Result<Task> {
        self.kernel.task_for_pid(pid)
    }

    fn cached_physical_memory(&self) -> Result<u64> {
        if let Some(bytes) = self.physical_memory.get() {
            return Ok(*bytes);
        }
        let bytes = self.kernel.physical_memory()?;
        Ok(*self.physical_memory.get_or_init(|| bytes))
    }
}
