// Memory and swap samples

use serde::{Deserialize, Serialize};

use super::units::pages_to_bytes;

/// Raw virtual-memory counters, in pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmStatistics {
    /// Bytes per page
    pub page_size: u64,
    /// Pages the kernel will not reclaim
    pub wired: u64,
    /// Anonymous (swap-backed) pages
    pub internal: u64,
    /// Pages that may be discarded without writing them anywhere
    pub purgeable: u64,
    /// Pages backing compressed memory
    pub compressed: u64,
    /// Cumulative page faults
    pub faults: u64,
}

impl VmStatistics {
    /// Pages in use: wired + internal - purgeable + compressed
    pub fn used_pages(&self) -> u64 {
        self.wired
            .saturating_add(self.internal)
            .saturating_sub(self.purgeable)
            .saturating_add(self.compressed)
    }

    pub fn used_bytes(&self) -> u64 {
        pages_to_bytes(self.used_pages(), self.page_size)
    }
}

/// Swap space usage, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapUsage {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub page_size: u64,
}

/// Point-in-time memory sample, in bytes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySample {
    pub memory_free: u64,
    pub memory_used: u64,
    pub memory_pagedout: u64,
    pub fault_count: u64,
    pub memory_limit: u64,
    pub memory_committed: u64,
}

impl MemorySample {
    /// Combine physical memory, VM counters and swap usage
    ///
    /// All arithmetic saturates: a used figure above physical memory yields
    /// zero free bytes rather than wrapping.
    pub fn compose(physical_memory: u64, vm: &VmStatistics, swap: &SwapUsage) -> Self {
        let memory_used = vm.used_bytes();
        let memory_free = physical_memory.saturating_sub(memory_used);

        Self {
            memory_free,
            memory_used,
            memory_pagedout: swap.used,
            fault_count: vm.faults,
            memory_limit: physical_memory.saturating_add(swap.total),
            memory_committed: physical_memory
                .saturating_add(swap.used)
                .saturating_sub(memory_free),
        }
    }
}
