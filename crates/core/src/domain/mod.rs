// Domain Layer - Samples and unit conversion

pub mod cpu;
pub mod memory;
pub mod process;
pub mod record;
pub mod units;

// Re-exports
pub use cpu::{CpuSample, CpuTicks, CpuTimes};
pub use memory::{MemorySample, SwapUsage, VmStatistics};
pub use process::{
    Pid, ProcessCpuSample, ProcessMemoryPages, ProcessMemorySample, Task, ThreadBasicInfo,
    ThreadId,
};
pub use record::{ProcessRecord, SampleRecord};
