// Clock Port (for testability)

use std::time::Duration;

/// Clock interface (allows delta sampling without real sleeps in tests)
pub trait Clock: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Block the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// System clock (production)
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Clock that advances instantly and records every sleep
    pub struct MockClock {
        now: Mutex<i64>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl MockClock {
        pub fn new(start_millis: i64) -> Self {
            Self {
                now: Mutex::new(start_millis),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    impl Clock for MockClock {
        fn now_millis(&self) -> i64 {
            *self.now.lock().unwrap()
        }

        fn sleep(&self, duration: Duration) {
            *self.now.lock().unwrap() += duration.as_millis() as i64;
            self.sleeps.lock().unwrap().push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::MockClock;
    use super::*;

    #[test]
    fn test_mock_clock_advances_on_sleep() {
        let clock = MockClock::new(1_000);
        clock.sleep(Duration::from_millis(250));
        assert_eq!(clock.now_millis(), 1_250);
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(250)]);
    }

    #[test]
    fn test_system_clock_sleeps() {
        let clock = SystemClock;
        let before = std::time::Instant::now();
        clock.sleep(Duration::from_millis(10));
        assert!(before.elapsed() >= Duration::from_millis(10));
        assert!(clock.now_millis() > 0);
    }
}
