// Human-readable rendering of samples

use std::time::Duration;
use tabled::{Table, Tabled};

use kstat_core::domain::{
    CpuSample, CpuTimes, MemorySample, ProcessCpuSample, ProcessMemorySample, SwapUsage,
};

#[derive(Tabled)]
pub struct Row {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

fn row(field: &str, value: impl Into<String>) -> Row {
    Row {
        field: field.to_string(),
        value: value.into(),
    }
}

pub fn table(rows: Vec<Row>) -> String {
    Table::new(rows).to_string()
}

/// Bytes with a binary unit suffix (KiB, MiB, ...)
pub fn bytes(value: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

    let mut scaled = value as f64;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", value)
    } else {
        format!("{:.2} {}", scaled, UNITS[unit])
    }
}

pub fn seconds(value: Duration) -> String {
    format!("{:.2}s", value.as_secs_f64())
}

pub fn cpu_rows(sample: &CpuSample, times: &CpuTimes) -> Vec<Row> {
    vec![
        row(
            "user",
            format!("{} ticks ({})", sample.total_user_time, seconds(times.user)),
        ),
        row(
            "system",
            format!(
                "{} ticks ({})",
                sample.total_system_time,
                seconds(times.system)
            ),
        ),
        row(
            "idle",
            format!("{} ticks ({})", sample.total_idle_time, seconds(times.idle)),
        ),
        row("busy", format!("{:.1}%", sample.busy_percent())),
    ]
}

pub fn memory_rows(sample: &MemorySample) -> Vec<Row> {
    vec![
        row("used", bytes(sample.memory_used)),
        row("free", bytes(sample.memory_free)),
        row("paged out", bytes(sample.memory_pagedout)),
        row("committed", bytes(sample.memory_committed)),
        row("limit", bytes(sample.memory_limit)),
        row("faults", sample.fault_count.to_string()),
    ]
}

pub fn swap_rows(swap: &SwapUsage) -> Vec<Row> {
    vec![
        row("total", bytes(swap.total)),
        row("used", bytes(swap.used)),
        row("available", bytes(swap.available)),
        row("page size", bytes(swap.page_size)),
    ]
}

pub fn process_rows(cpu: &ProcessCpuSample, memory: &ProcessMemorySample) -> Vec<Row> {
    vec![
        row("cpu time", seconds(cpu.total_time)),
        row("threads", cpu.thread_count.to_string()),
        row("resident", bytes(memory.resident_size)),
        row("virtual", bytes(memory.virtual_size)),
        row("shared", bytes(memory.shared_size)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes() {
        assert_eq!(bytes(0), "0 B");
        assert_eq!(bytes(1023), "1023 B");
        assert_eq!(bytes(1536), "1.50 KiB");
        assert_eq!(bytes(8 * 1024 * 1024 * 1024), "8.00 GiB");
    }

    #[test]
    fn test_seconds() {
        assert_eq!(seconds(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_cpu_rows_show_busy_share() {
        let sample = CpuSample {
            total_system_time: 10,
            total_user_time: 30,
            total_idle_time: 60,
        };
        let rows = cpu_rows(&sample, &sample.to_times(100));
        assert_eq!(rows[0].value, "30 ticks (0.30s)");
        assert_eq!(rows[3].value, "40.0%");
    }

    #[test]
    fn test_table_renders_fields() {
        let rendered = table(memory_rows(&MemorySample {
            memory_used: 2048,
            fault_count: 9,
            ..MemorySample::default()
        }));
        assert!(rendered.contains("used"));
        assert!(rendered.contains("2.00 KiB"));
        assert!(rendered.contains("faults"));
    }
}
