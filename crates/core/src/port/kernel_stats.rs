// Kernel statistics port
// Adapters call the kernel; core does the arithmetic

use crate::domain::{
    CpuTicks, Pid, ProcessMemoryPages, SwapUsage, Task, ThreadBasicInfo, ThreadId, VmStatistics,
};
use crate::error::Result;

/// Raw kernel counters, one synchronous call per method
///
/// Implementations return what the kernel reports without normalization.
/// Errors come back unchanged so callers see the OS error code.
pub trait KernelStats: Send + Sync {
    /// Aggregate CPU tick counters across all CPUs
    fn cpu_ticks(&self) -> Result<CpuTicks>;

    /// Virtual-memory page counters
    fn vm_statistics(&self) -> Result<VmStatistics>;

    /// Installed physical memory, in bytes
    fn physical_memory(&self) -> Result<u64>;

    /// Swap space usage, in bytes
    fn swap_usage(&self) -> Result<SwapUsage>;

    /// Open a handle on a live process
    fn task_for_pid(&self, pid: Pid) -> Result<Task>;

    /// Threads currently belonging to the task
    fn task_threads(&self, task: &Task) -> Result<Vec<ThreadId>>;

    /// CPU counters of one thread
    fn thread_info(&self, task: &Task, thread: ThreadId) -> Result<ThreadBasicInfo>;

    /// Memory counters of the task, in pages
    fn process_memory(&self, task: &Task) -> Result<ProcessMemoryPages>;

    /// Online CPUs
    fn cpu_count(&self) -> Result<u32>;

    /// Clock ticks per second used by the tick counters
    fn clock_ticks_per_second(&self) -> Result<u64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::SampleError;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// errno for "no such process"
    pub const ESRCH: i32 = 3;

    type Reply<T> = std::result::Result<T, i32>;

    fn reply<T: Clone>(r: &Reply<T>) -> Result<T> {
        r.clone()
            .map_err(|errno| SampleError::Io(std::io::Error::from_raw_os_error(errno)))
    }

    /// Scripted process for MockKernelStats
    #[derive(Debug, Clone, Default)]
    pub struct MockProcess {
        /// `None` makes `thread_info` fail for that thread
        pub threads: Vec<(ThreadId, Option<ThreadBasicInfo>)>,
        pub memory: ProcessMemoryPages,
    }

    /// Mock KernelStats for testing
    ///
    /// CPU replies are consumed in order; the last one repeats.
    pub struct MockKernelStats {
        cpu: Mutex<VecDeque<Reply<CpuTicks>>>,
        vm: Mutex<Reply<VmStatistics>>,
        physical: Mutex<Reply<u64>>,
        swap: Mutex<Reply<SwapUsage>>,
        processes: Mutex<HashMap<Pid, MockProcess>>,
        cpus: u32,
        ticks_per_second: u64,
        physical_calls: AtomicUsize,
        cpu_calls: AtomicUsize,
    }

    impl MockKernelStats {
        pub fn new() -> Self {
            Self {
                cpu: Mutex::new(VecDeque::from([Ok(CpuTicks::default())])),
                vm: Mutex::new(Ok(VmStatistics {
                    page_size: 4096,
                    ..VmStatistics::default()
                })),
                physical: Mutex::new(Ok(0)),
                swap: Mutex::new(Ok(SwapUsage::default())),
                processes: Mutex::new(HashMap::new()),
                cpus: 4,
                ticks_per_second: 100,
                physical_calls: AtomicUsize::new(0),
                cpu_calls: AtomicUsize::new(0),
            }
        }

        pub fn with_cpu_ticks(self, ticks: impl IntoIterator<Item = CpuTicks>) -> Self {
            *self.cpu.lock().unwrap() = ticks.into_iter().map(Ok).collect();
            self
        }

        /// Queue a CPU reply that fails with `errno`
        pub fn push_cpu_error(&self, errno: i32) {
            self.cpu.lock().unwrap().push_back(Err(errno));
        }

        pub fn with_vm(self, vm: VmStatistics) -> Self {
            *self.vm.lock().unwrap() = Ok(vm);
            self
        }

        pub fn with_physical_memory(self, bytes: u64) -> Self {
            *self.physical.lock().unwrap() = Ok(bytes);
            self
        }

        pub fn with_swap(self, swap: SwapUsage) -> Self {
            *self.swap.lock().unwrap() = Ok(swap);
            self
        }

        pub fn with_process(self, pid: Pid, process: MockProcess) -> Self {
            self.processes.lock().unwrap().insert(pid, process);
            self
        }

        pub fn with_cpus(mut self, cpus: u32) -> Self {
            self.cpus = cpus;
            self
        }

        pub fn set_physical_error(&self, errno: i32) {
            *self.physical.lock().unwrap() = Err(errno);
        }

        pub fn set_physical_memory(&self, bytes: u64) {
            *self.physical.lock().unwrap() = Ok(bytes);
        }

        pub fn set_swap_error(&self, errno: i32) {
            *self.swap.lock().unwrap() = Err(errno);
        }

        pub fn physical_calls(&self) -> usize {
            self.physical_calls.load(Ordering::SeqCst)
        }

        pub fn cpu_calls(&self) -> usize {
            self.cpu_calls.load(Ordering::SeqCst)
        }

        fn process(&self, pid: Pid) -> Result<MockProcess> {
            self.processes
                .lock()
                .unwrap()
                .get(&pid)
                .cloned()
                .ok_or_else(|| SampleError::Io(std::io::Error::from_raw_os_error(ESRCH)))
        }
    }

    impl Default for MockKernelStats {
        fn default() -> Self {
            Self::new()
        }
    }

    impl KernelStats for MockKernelStats {
        fn cpu_ticks(&self) -> Result<CpuTicks> {
            self.cpu_calls.fetch_add(1, Ordering::SeqCst);
            let mut queue = self.cpu.lock().unwrap();
            let next = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            match next {
                Some(r) => reply(&r),
                None => Ok(CpuTicks::default()),
            }
        }

        fn vm_statistics(&self) -> Result<VmStatistics> {
            reply(&self.vm.lock().unwrap())
        }

        fn physical_memory(&self) -> Result<u64> {
            self.physical_calls.fetch_add(1, Ordering::SeqCst);
            reply(&self.physical.lock().unwrap())
        }

        fn swap_usage(&self) -> Result<SwapUsage> {
            reply(&self.swap.lock().unwrap())
        }

        fn task_for_pid(&self, pid: Pid) -> Result<Task> {
            self.process(pid).map(|_| Task { pid })
        }

        fn task_threads(&self, task: &Task) -> Result<Vec<ThreadId>> {
            let process = self.process(task.pid)?;
            Ok(process.threads.iter().map(|(tid, _)| *tid).collect())
        }

        fn thread_info(&self, task: &Task, thread: ThreadId) -> Result<ThreadBasicInfo> {
            let process = self.process(task.pid)?;
            process
                .threads
                .iter()
                .find(|(tid, _)| *tid == thread)
                .and_then(|(_, info)| *info)
                .ok_or_else(|| SampleError::Io(std::io::Error::from_raw_os_error(ESRCH)))
        }

        fn process_memory(&self, task: &Task) -> Result<ProcessMemoryPages> {
            Ok(self.process(task.pid)?.memory)
        }

        fn cpu_count(&self) -> Result<u32> {
            Ok(self.cpus)
        }

        fn clock_ticks_per_second(&self) -> Result<u64> {
            Ok(self.ticks_per_second)
        }
    }
}
