// kstat Infrastructure - Linux procfs adapter
// Implements: KernelStats

pub mod parse;
pub mod procfs_kernel_stats;
pub mod sysconf;

pub use procfs_kernel_stats::{ProcfsKernelStats, DEFAULT_PROC_ROOT};
