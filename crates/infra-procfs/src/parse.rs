//! Parsers for the procfs text formats the adapter reads.
//!
//! Each parser takes the whole file content and returns raw counters in the
//! unit the kernel uses (ticks, pages, KiB). No unit conversion happens here.

use std::collections::HashMap;

use kstat_core::domain::CpuTicks;
use kstat_core::{Result, SampleError};

/// `/proc/vmstat` counters the adapter needs, in pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmCounters {
    pub active_anon: u64,
    pub inactive_anon: u64,
    pub unevictable: u64,
    pub page_table_pages: u64,
    pub zspages: u64,
    pub pgfault: u64,
}

/// Fields of `/proc/<pid>/task/<tid>/stat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadStat {
    pub comm: String,
    pub state: char,
    pub utime: u64,
    pub stime: u64,
}

/// `/proc/<pid>/statm`, in pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statm {
    pub size: u64,
    pub resident: u64,
    pub shared: u64,
}

/// Aggregate `cpu` line of `/proc/stat`
///
/// ```text
/// cpu  user nice system idle iowait irq softirq steal guest guest_nice
/// ```
/// Older kernels stop after fewer columns; missing ones read as zero.
pub fn parse_cpu_ticks(content: &str) -> Result<CpuTicks> {
    let line = content
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| SampleError::parse("/proc/stat", "no aggregate cpu line"))?;

    let values = line
        .split_whitespace()
        .skip(1)
        .map(|v| {
            v.parse::<u64>()
                .map_err(|e| SampleError::parse("/proc/stat", format!("{:?}: {}", v, e)))
        })
        .collect::<Result<Vec<u64>>>()?;

    if values.len() < 4 {
        return Err(SampleError::parse(
            "/proc/stat",
            format!("cpu line has {} columns, need 4", values.len()),
        ));
    }

    let col = |i: usize| values.get(i).copied().unwrap_or(0);
    Ok(CpuTicks {
        user: col(0),
        nice: col(1),
        system: col(2),
        idle: col(3),
        iowait: col(4),
        irq: col(5),
        softirq: col(6),
        steal: col(7),
    })
}

/// `key value` pairs of `/proc/vmstat`
pub fn parse_vmstat(content: &str) -> Result<VmCounters> {
    let fields: HashMap<&str, u64> = content
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let key = parts.next()?;
            let value = parts.next()?.parse().ok()?;
            Some((key, value))
        })
        .collect();

    let required = |key: &'static str| {
        fields
            .get(key)
            .copied()
            .ok_or_else(|| SampleError::parse("/proc/vmstat", format!("missing {}", key)))
    };

    Ok(VmCounters {
        active_anon: required("nr_active_anon")?,
        inactive_anon: required("nr_inactive_anon")?,
        unevictable: required("nr_unevictable")?,
        page_table_pages: required("nr_page_table_pages")?,
        // zsmalloc only reports when zram/zswap is built in
        zspages: fields.get("nr_zspages").copied().unwrap_or(0),
        pgfault: required("pgfault")?,
    })
}

/// `MemTotal` of `/proc/meminfo`, in KiB
pub fn parse_mem_total_kib(content: &str) -> Result<u64> {
    content
        .lines()
        .find_map(|line| {
            let rest = line.strip_prefix("MemTotal:")?;
            rest.split_whitespace().next()?.parse().ok()
        })
        .ok_or_else(|| SampleError::parse("/proc/meminfo", "no MemTotal"))
}

/// Sum of `Size` and `Used` over every `/proc/swaps` entry, in KiB
///
/// ```text
/// Filename                Type        Size      Used    Priority
/// /dev/dm-1               partition   8388604   10240   -2
/// ```
pub fn parse_swaps_kib(content: &str) -> Result<(u64, u64)> {
    let mut total = 0u64;
    let mut used = 0u64;

    for line in content.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 4 {
            return Err(SampleError::parse(
                "/proc/swaps",
                format!("short entry {:?}", line),
            ));
        }
        let number = |v: &str| {
            v.parse::<u64>()
                .map_err(|e| SampleError::parse("/proc/swaps", format!("{:?}: {}", v, e)))
        };
        total = total.saturating_add(number(fields[2])?);
        used = used.saturating_add(number(fields[3])?);
    }

    Ok((total, used))
}

/// `/proc/<pid>/task/<tid>/stat`
///
/// `comm` sits in parentheses and may itself contain spaces and parentheses,
/// so fields are counted from the last `)`.
pub fn parse_thread_stat(content: &str) -> Result<ThreadStat> {
    let open = content
        .find('(')
        .ok_or_else(|| SampleError::parse("task stat", "no comm"))?;
    let close = content
        .rfind(')')
        .ok_or_else(|| SampleError::parse("task stat", "unterminated comm"))?;
    if close < open {
        return Err(SampleError::parse("task stat", "unterminated comm"));
    }

    let comm = content[open + 1..close].to_string();
    let fields: Vec<&str> = content[close + 1..].split_whitespace().collect();

    // After comm: state(0) ppid(1) pgrp(2) session(3) tty_nr(4) tpgid(5)
    //   flags(6) minflt(7) cminflt(8) majflt(9) cmajflt(10) utime(11) stime(12)
    let state = fields
        .first()
        .and_then(|s| s.chars().next())
        .ok_or_else(|| SampleError::parse("task stat", "no state"))?;
    let tick = |i: usize, name: &str| {
        fields
            .get(i)
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| SampleError::parse("task stat", format!("bad {}", name)))
    };

    Ok(ThreadStat {
        comm,
        state,
        utime: tick(11, "utime")?,
        stime: tick(12, "stime")?,
    })
}

/// `/proc/<pid>/statm`: size resident shared text lib data dt
pub fn parse_statm(content: &str) -> Result<Statm> {
    let values: Vec<u64> = content
        .split_whitespace()
        .take(3)
        .map(|v| {
            v.parse::<u64>()
                .map_err(|e| SampleError::parse("statm", format!("{:?}: {}", v, e)))
        })
        .collect::<Result<_>>()?;

    match values.as_slice() {
        [size, resident, shared] => Ok(Statm {
            size: *size,
            resident: *resident,
            shared: *shared,
        }),
        _ => Err(SampleError::parse("statm", "fewer than 3 fields")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "cpu  4705 356 584 3699176 23060 0 277 13 0 0\n\
                        cpu0 1393280 32966 572056 13343292 6130 0 17875 0 0 0\n\
                        intr 1462898\n\
                        ctxt 1193213\n";

    #[test]
    fn test_parse_cpu_ticks() {
        let ticks = parse_cpu_ticks(STAT).unwrap();
        assert_eq!(ticks.user, 4705);
        assert_eq!(ticks.nice, 356);
        assert_eq!(ticks.system, 584);
        assert_eq!(ticks.idle, 3699176);
        assert_eq!(ticks.iowait, 23060);
        assert_eq!(ticks.irq, 0);
        assert_eq!(ticks.softirq, 277);
        assert_eq!(ticks.steal, 13);
    }

    #[test]
    fn test_parse_cpu_ticks_old_kernel_columns() {
        let ticks = parse_cpu_ticks("cpu 10 20 30 40\n").unwrap();
        assert_eq!(ticks.idle, 40);
        assert_eq!(ticks.iowait, 0);
        assert_eq!(ticks.steal, 0);
    }

    #[test]
    fn test_parse_cpu_ticks_rejects_garbage() {
        assert!(parse_cpu_ticks("cpu0 1 2 3 4\n").is_err());
        assert!(parse_cpu_ticks("cpu 1 2\n").is_err());
        assert!(parse_cpu_ticks("cpu 1 2 x 4\n").is_err());
    }

    #[test]
    fn test_parse_vmstat() {
        let content = "nr_free_pages 123\n\
                       nr_inactive_anon 2000\n\
                       nr_active_anon 3000\n\
                       nr_unevictable 40\n\
                       nr_page_table_pages 60\n\
                       pgfault 987654\n";
        let vm = parse_vmstat(content).unwrap();
        assert_eq!(vm.active_anon, 3000);
        assert_eq!(vm.inactive_anon, 2000);
        assert_eq!(vm.unevictable, 40);
        assert_eq!(vm.page_table_pages, 60);
        assert_eq!(vm.zspages, 0);
        assert_eq!(vm.pgfault, 987654);
    }

    #[test]
    fn test_parse_vmstat_missing_counter() {
        let err = parse_vmstat("nr_active_anon 1\n").unwrap_err();
        assert!(err.to_string().contains("nr_inactive_anon"));
    }

    #[test]
    fn test_parse_mem_total() {
        let content = "MemTotal:       16303428 kB\nMemFree:         1260932 kB\n";
        assert_eq!(parse_mem_total_kib(content).unwrap(), 16303428);
        assert!(parse_mem_total_kib("MemFree: 1 kB\n").is_err());
    }

    #[test]
    fn test_parse_swaps() {
        let content = "Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority\n\
                       /dev/dm-1                               partition\t8388604\t\t10240\t\t-2\n\
                       /swapfile                               file\t\t1048572\t\t0\t\t-3\n";
        assert_eq!(parse_swaps_kib(content).unwrap(), (9437176, 10240));
    }

    #[test]
    fn test_parse_swaps_without_devices() {
        let content = "Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority\n";
        assert_eq!(parse_swaps_kib(content).unwrap(), (0, 0));
    }

    #[test]
    fn test_parse_thread_stat() {
        let content = "12345 (gst-streaming) S 12340 12345 12345 0 -1 1077944320 \
                       150 0 0 0 420 38 0 0 20 0 1 0 1234567 12345678 100";
        let stat = parse_thread_stat(content).unwrap();
        assert_eq!(stat.comm, "gst-streaming");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.utime, 420);
        assert_eq!(stat.stime, 38);
    }

    #[test]
    fn test_parse_thread_stat_comm_with_parens() {
        let content = "77 (worker (io) 2) I 2 0 0 0 -1 69238880 0 0 0 0 5 9 0 0 20 0";
        let stat = parse_thread_stat(content).unwrap();
        assert_eq!(stat.comm, "worker (io) 2");
        assert_eq!(stat.state, 'I');
        assert_eq!(stat.utime, 5);
        assert_eq!(stat.stime, 9);
    }

    #[test]
    fn test_parse_thread_stat_truncated() {
        assert!(parse_thread_stat("1 (a) R 0 0").is_err());
        assert!(parse_thread_stat("garbage").is_err());
    }

    #[test]
    fn test_parse_statm() {
        let statm = parse_statm("48362 1963 1476 110 0 1006 0\n").unwrap();
        assert_eq!(statm.size, 48362);
        assert_eq!(statm.resident, 1963);
        assert_eq!(statm.shared, 1476);
        assert!(parse_statm("1 2\n").is_err());
    }
}
