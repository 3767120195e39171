// KernelStats over Linux procfs
// reason: procfs is the kernel's statistics interface on Linux; sysconf via nix
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use kstat_core::domain::units::kib_to_bytes;
use kstat_core::domain::{
    CpuTicks, Pid, ProcessMemoryPages, SwapUsage, Task, ThreadBasicInfo, ThreadId, VmStatistics,
};
use kstat_core::port::KernelStats;
use kstat_core::Result;

use crate::parse;
use crate::sysconf;

/// Default procfs mount point
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Thread state letter of an idle kernel thread
const IDLE_THREAD_STATE: char = 'I';

/// KernelStats reading procfs
///
/// Every call reads the relevant file afresh. I/O errors are returned as is,
/// so a vanished process shows up as `ENOENT` from the kernel.
pub struct ProcfsKernelStats {
    root: PathBuf,
}

impl ProcfsKernelStats {
    /// Adapter over the live `/proc`
    ///
    /// # Example
    /// ```ignore
    /// let kernel = ProcfsKernelStats::new();
    /// let ticks = kernel.cpu_ticks()?;
    /// ```
    pub fn new() -> Self {
        Self::with_root(DEFAULT_PROC_ROOT)
    }

    /// Adapter over a procfs tree mounted elsewhere (containers, fixtures)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, relative: impl AsRef<Path>) -> Result<String> {
        let path = self.root.join(relative);
        trace!(path = %path.display(), "Reading procfs file");
        Ok(fs::read_to_string(&path)?)
    }

    fn task_dir(&self, task: &Task) -> PathBuf {
        self.root.join(task.pid.to_string())
    }
}

impl Default for ProcfsKernelStats {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelStats for ProcfsKernelStats {
    fn cpu_ticks(&self) -> Result<CpuTicks> {
        parse::parse_cpu_ticks(&self.read("stat")?)
    }

    fn vm_statistics(&self) -> Result<VmStatistics> {
        let counters = parse::parse_vmstat(&self.read("vmstat")?)?;
        let page_size = sysconf::page_size()?;

        // Lazily freed (MADV_FREE) pages leave the anon lists, so nothing
        // remains to subtract as purgeable.
        Ok(VmStatistics {
            page_size,
            wired: counters
                .unevictable
                .saturating_add(counters.page_table_pages),
            internal: counters
                .active_anon
                .saturating_add(counters.inactive_anon),
            purgeable: 0,
            compressed: counters.zspages,
            faults: counters.pgfault,
        })
    }

    fn physical_memory(&self) -> Result<u64> {
        let kib = parse::parse_mem_total_kib(&self.read("meminfo")?)?;
        Ok(kib_to_bytes(kib))
    }

    fn swap_usage(&self) -> Result<SwapUsage> {
        let (total_kib, used_kib) = parse::parse_swaps_kib(&self.read("swaps")?)?;
        let total = kib_to_bytes(total_kib);
        let used = kib_to_bytes(used_kib);

        Ok(SwapUsage {
            total,
            available: total.saturating_sub(used),
            used,
            page_size: sysconf::page_size()?,
        })
    }

    fn task_for_pid(&self, pid: Pid) -> Result<Task> {
        let task = Task { pid };
        fs::metadata(self.task_dir(&task))?;
        Ok(task)
    }

    fn task_threads(&self, task: &Task) -> Result<Vec<ThreadId>> {
        let mut threads = Vec::new();
        for entry in fs::read_dir(self.task_dir(task).join("task"))? {
            let entry = entry?;
            // Entries are numeric tids; anything else is not a thread
            if let Some(tid) = entry.file_name().to_str().and_then(|s| s.parse().ok()) {
                threads.push(tid);
            }
        }
        threads.sort_unstable();

        debug!(pid = %task.pid, threads = threads.len(), "Enumerated task threads");
        Ok(threads)
    }

    fn thread_info(&self, task: &Task, thread: ThreadId) -> Result<ThreadBasicInfo> {
        let path = self
            .task_dir(task)
            .join("task")
            .join(thread.to_string())
            .join("stat");
        let stat = parse::parse_thread_stat(&fs::read_to_string(path)?)?;

        Ok(ThreadBasicInfo {
            user_time: stat.utime,
            system_time: stat.stime,
            idle: stat.state == IDLE_THREAD_STATE,
        })
    }

    fn process_memory(&self, task: &Task) -> Result<ProcessMemoryPages> {
        let statm = parse::parse_statm(&fs::read_to_string(self.task_dir(task).join("statm"))?)?;

        Ok(ProcessMemoryPages {
            page_size: sysconf::page_size()?,
            virtual_pages: statm.size,
            resident_pages: statm.resident,
            shared_pages: statm.shared,
        })
    }

    fn cpu_count(&self) -> Result<u32> {
        let cpus = sysconf::online_cpus()?;
        Ok(u32::try_from(cpus).unwrap_or(u32::MAX))
    }

    fn clock_ticks_per_second(&self) -> Result<u64> {
        sysconf::clock_ticks_per_second()
    }
}
