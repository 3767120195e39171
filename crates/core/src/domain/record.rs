// Monitor output record

use serde::{Deserialize, Serialize};

use super::{CpuSample, MemorySample, Pid, ProcessCpuSample, ProcessMemorySample};

/// Samples of one watched process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub cpu: ProcessCpuSample,
    pub memory: ProcessMemorySample,
}

/// Everything the monitor collected in one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Milliseconds since epoch at the end of the cycle
    pub timestamp_ms: i64,
    /// CPU ticks spent during the delta window
    pub cpu: CpuSample,
    pub cpu_busy_percent: f64,
    pub memory: MemorySample,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub processes: Vec<ProcessRecord>,
}
