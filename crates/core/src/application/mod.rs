// Application Layer - Sampling use cases

pub mod monitor;
pub mod sampler;

// Re-exports
pub use monitor::{shutdown_channel, Monitor, MonitorConfig, ShutdownSender, ShutdownToken};
pub use sampler::Sampler;
