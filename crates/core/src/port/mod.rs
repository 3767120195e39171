// Port Layer - Interfaces for external dependencies

pub mod clock; // For deterministic delta sampling
pub mod kernel_stats;
pub mod sample_sink;

// Re-exports
pub use clock::{Clock, SystemClock};
pub use kernel_stats::KernelStats;
pub use sample_sink::SampleSink;
