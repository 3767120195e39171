// Unit conversion: kernel counters to time and bytes

use std::time::Duration;

/// Bytes per kibibyte (procfs reports "kB" meaning KiB)
pub const BYTES_PER_KIB: u64 = 1024;

/// Convert a clock-tick count to wall time
///
/// `ticks_per_second` is the kernel's USER_HZ. Zero yields `Duration::ZERO`
/// instead of dividing by zero.
pub fn ticks_to_duration(ticks: u64, ticks_per_second: u64) -> Duration {
    if ticks_per_second == 0 {
        return Duration::ZERO;
    }
    let secs = ticks / ticks_per_second;
    let rem = ticks % ticks_per_second;
    // rem < ticks_per_second, so the quotient is below one second
    let nanos = u128::from(rem) * 1_000_000_000 / u128::from(ticks_per_second);
    Duration::new(secs, nanos as u32)
}

/// Convert a page count to bytes, saturating on overflow
pub fn pages_to_bytes(pages: u64, page_size: u64) -> u64 {
    pages.saturating_mul(page_size)
}

/// Convert a procfs "kB" value to bytes
pub fn kib_to_bytes(kib: u64) -> u64 {
    kib.saturating_mul(BYTES_PER_KIB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_to_duration() {
        assert_eq!(ticks_to_duration(250, 100), Duration::from_millis(2500));
        assert_eq!(ticks_to_duration(1, 3), Duration::new(0, 333_333_333));
        assert_eq!(ticks_to_duration(42, 0), Duration::ZERO);
    }

    #[test]
    fn test_ticks_to_duration_large_counter() {
        let ticks = u64::MAX;
        let d = ticks_to_duration(ticks, 100);
        assert_eq!(d.as_secs(), u64::MAX / 100);
    }

    #[test]
    fn test_ticks_to_duration_huge_tick_rate() {
        let hz = u64::MAX;
        assert_eq!(ticks_to_duration(hz - 1, hz).as_secs(), 0);
        assert_eq!(ticks_to_duration(hz / 2, hz), Duration::new(0, 499_999_999));
        assert_eq!(ticks_to_duration(hz, hz), Duration::from_secs(1));
    }

    #[test]
    fn test_pages_and_kib() {
        assert_eq!(pages_to_bytes(3, 4096), 12288);
        assert_eq!(pages_to_bytes(u64::MAX, 4096), u64::MAX);
        assert_eq!(kib_to_bytes(16), 16384);
    }
}
