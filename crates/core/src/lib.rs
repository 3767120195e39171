// kstat Core - Samples, Unit Conversion & Ports
// NO kernel access here: adapters implement the ports

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{Result, SampleError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
