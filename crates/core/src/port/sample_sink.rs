// Sample sink port - where monitor records go

use crate::domain::SampleRecord;
use crate::error::Result;

/// Destination for monitor records (stdout, file, test buffer)
pub trait SampleSink: Send + Sync {
    fn emit(&self, record: &SampleRecord) -> Result<()>;
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Collects records in memory
    #[derive(Default)]
    pub struct MockSampleSink {
        records: Mutex<Vec<SampleRecord>>,
    }

    impl MockSampleSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn records(&self) -> Vec<SampleRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl SampleSink for MockSampleSink {
        fn emit(&self, record: &SampleRecord) -> Result<()> {
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }
}
