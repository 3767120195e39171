//! SampleSink writing one JSON object per line.

use std::io::{self, Write};
use std::sync::Mutex;

use kstat_core::domain::SampleRecord;
use kstat_core::port::SampleSink;
use kstat_core::{Result, SampleError};

pub struct JsonLinesSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> SampleSink for JsonLinesSink<W> {
    fn emit(&self, record: &SampleRecord) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| SampleError::Internal("sink writer poisoned".to_string()))?;

        serde_json::to_writer(&mut *out, record).map_err(io::Error::from)?;
        out.write_all(b"\n")?;
        // Readers consume line by line; do not sit on a buffered record
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kstat_core::domain::{
        CpuSample, MemorySample, Pid, ProcessCpuSample, ProcessMemorySample, ProcessRecord,
    };
    use std::time::Duration;

    fn record(processes: Vec<ProcessRecord>) -> SampleRecord {
        SampleRecord {
            timestamp_ms: 1_700_000_000_000,
            cpu: CpuSample {
                total_system_time: 5,
                total_user_time: 15,
                total_idle_time: 30,
            },
            cpu_busy_percent: 40.0,
            memory: MemorySample {
                memory_free: 100,
                memory_used: 200,
                ..MemorySample::default()
            },
            processes,
        }
    }

    #[test]
    fn test_emits_one_line_per_record() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(&record(vec![])).unwrap();
        sink.emit(&record(vec![])).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["cpu"]["total_user_time"], 15);
        assert_eq!(value["memory"]["memory_used"], 200);
        // Empty process list is omitted
        assert!(value.get("processes").is_none());
    }

    #[test]
    fn test_record_round_trips_with_processes() {
        let original = record(vec![ProcessRecord {
            pid: Pid(42),
            cpu: ProcessCpuSample {
                total_time: Duration::from_millis(1500),
                thread_count: 3,
            },
            memory: ProcessMemorySample {
                virtual_size: 4096,
                resident_size: 2048,
                shared_size: 0,
            },
        }]);

        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(&original).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: SampleRecord = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(parsed, original);
    }
}
