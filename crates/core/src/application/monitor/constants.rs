// Monitor constants (no magic values)
use std::time::Duration;

/// Time between the start of two monitor cycles (1s)
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Window of the delta CPU sample taken each cycle (500ms)
/// Must stay below the sample interval
pub const DEFAULT_CPU_WINDOW: Duration = Duration::from_millis(500);

/// Wait after a failed cycle before sampling again (1s)
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_secs(1);
