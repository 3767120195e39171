//! Sampler against the live /proc of the test host
//!
//! Values depend on the machine, so only relations that always hold are
//! asserted.
#![cfg(target_os = "linux")]

use std::sync::Arc;
use std::time::Duration;

use kstat_core::application::Sampler;
use kstat_core::domain::Pid;
use kstat_core::port::SystemClock;
use kstat_infra_procfs::ProcfsKernelStats;

fn sampler() -> Sampler {
    Sampler::new(Arc::new(ProcfsKernelStats::new()), Arc::new(SystemClock))
}

fn own_pid() -> Pid {
    Pid(std::process::id() as i32)
}

#[test]
fn test_cpu_counters_only_grow() {
    let sampler = sampler();

    let first = sampler.sample_cpu_load().unwrap();
    assert!(first.total() > 0);

    let delta = sampler
        .delta_sample_cpu_load(Duration::from_millis(50))
        .unwrap();
    let after = sampler.sample_cpu_load().unwrap();

    assert!(after.total() >= first.total());
    assert!(delta.busy_percent() <= 100.0);
}

#[test]
fn test_memory_sample_relations() {
    let sampler = sampler();

    let physical = sampler.physical_memory().unwrap();
    let swap = sampler.swap_stat().unwrap();
    let memory = sampler.sample_memory_usage().unwrap();

    assert!(physical > 0);
    assert!(memory.memory_used > 0);
    assert!(memory.memory_used + memory.memory_free >= physical);
    assert!(memory.memory_limit >= physical);
    assert!(swap.used <= swap.total);
    assert_eq!(swap.available, swap.total - swap.used);
}

#[test]
fn test_own_process_sample() {
    let sampler = sampler();

    // Burn a little CPU so the total cannot be zero at any tick rate
    let mut acc: u64 = 0;
    let start = std::time::Instant::now();
    while start.elapsed() < Duration::from_millis(100) {
        acc = acc.wrapping_add(std::hint::black_box(acc) ^ 0x9e37_79b9);
    }
    std::hint::black_box(acc);

    let cpu = sampler.sample_process_cpu_load(own_pid()).unwrap();
    assert!(cpu.thread_count >= 1);
    assert!(cpu.total_time > Duration::ZERO);

    let memory = sampler.sample_process_memory(own_pid()).unwrap();
    assert!(memory.resident_size > 0);
    assert!(memory.virtual_size >= memory.resident_size);
}

#[test]
fn test_missing_process_reports_os_error() {
    let sampler = sampler();

    // Above the kernel's pid_max ceiling (4194304)
    let err = sampler.sample_process_cpu_load(Pid(i32::MAX)).unwrap_err();
    assert!(err.raw_os_error().is_some());
}

#[test]
fn test_cpu_count() {
    assert!(sampler().number_of_cpus() >= 1);
}
