// Per-process samples

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::units::pages_to_bytes;

/// Process identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub i32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Pid {
    fn from(raw: i32) -> Self {
        Pid(raw)
    }
}

/// Handle on a live process, obtained through `task_for_pid`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub pid: Pid,
}

/// Thread identifier within a task
pub type ThreadId = u32;

/// CPU counters of a single thread, in clock ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadBasicInfo {
    pub user_time: u64,
    pub system_time: u64,
    /// Kernel idle thread; its time is not work done by the process
    pub idle: bool,
}

/// Total CPU time consumed by a process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCpuSample {
    pub total_time: Duration,
    pub thread_count: u32,
}

/// Raw process memory counters, in pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessMemoryPages {
    pub page_size: u64,
    pub virtual_pages: u64,
    pub resident_pages: u64,
    pub shared_pages: u64,
}

/// Process memory sample, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMemorySample {
    pub virtual_size: u64,
    pub resident_size: u64,
    pub shared_size: u64,
}

impl From<ProcessMemoryPages> for ProcessMemorySample {
    fn from(pages: ProcessMemoryPages) -> Self {
        Self {
            virtual_size: pages_to_bytes(pages.virtual_pages, pages.page_size),
            resident_size: pages_to_bytes(pages.resident_pages, pages.page_size),
            shared_size: pages_to_bytes(pages.shared_pages, pages.page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_memory_from_pages() {
        let sample = ProcessMemorySample::from(ProcessMemoryPages {
            page_size: 4096,
            virtual_pages: 1000,
            resident_pages: 200,
            shared_pages: 50,
        });
        assert_eq!(sample.virtual_size, 4_096_000);
        assert_eq!(sample.resident_size, 819_200);
        assert_eq!(sample.shared_size, 204_800);
    }

    #[test]
    fn test_pid_serializes_as_number() {
        let json = serde_json::to_string(&Pid(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(Pid::from(7).to_string(), "7");
    }
}
