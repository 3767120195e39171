// CPU load samples

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::units::ticks_to_duration;

/// Raw aggregate CPU counters, in clock ticks, as the kernel reports them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTicks {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

/// Cumulative (or delta) CPU time split three ways, in clock ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSample {
    pub total_system_time: u64,
    pub total_user_time: u64,
    pub total_idle_time: u64,
}

impl CpuSample {
    /// Fold raw kernel counters into user / system / idle
    ///
    /// nice counts as user, interrupt servicing as system, I/O wait as idle.
    /// Steal time belongs to another guest and is dropped.
    pub fn from_ticks(ticks: &CpuTicks) -> Self {
        Self {
            total_system_time: ticks
                .system
                .saturating_add(ticks.irq)
                .saturating_add(ticks.softirq),
            total_user_time: ticks.user.saturating_add(ticks.nice),
            total_idle_time: ticks.idle.saturating_add(ticks.iowait),
        }
    }

    /// Ticks accumulated between `self` and a later sample
    ///
    /// A counter that went backwards (CPU hot-unplug) clamps to zero.
    pub fn delta(&self, later: &CpuSample) -> CpuSample {
        CpuSample {
            total_system_time: later.total_system_time.saturating_sub(self.total_system_time),
            total_user_time: later.total_user_time.saturating_sub(self.total_user_time),
            total_idle_time: later.total_idle_time.saturating_sub(self.total_idle_time),
        }
    }

    pub fn total(&self) -> u64 {
        self.total_system_time
            .saturating_add(self.total_user_time)
            .saturating_add(self.total_idle_time)
    }

    /// Share of non-idle time (0.0 - 100.0); zero when no ticks elapsed
    pub fn busy_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let busy = self.total_system_time.saturating_add(self.total_user_time);
        busy as f64 / total as f64 * 100.0
    }

    pub fn to_times(&self, ticks_per_second: u64) -> CpuTimes {
        CpuTimes {
            system: ticks_to_duration(self.total_system_time, ticks_per_second),
            user: ticks_to_duration(self.total_user_time, ticks_per_second),
            idle: ticks_to_duration(self.total_idle_time, ticks_per_second),
        }
    }
}

/// A `CpuSample` converted to wall time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTimes {
    pub system: Duration,
    pub user: Duration,
    pub idle: Duration,
}
