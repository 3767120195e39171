//! kstat CLI - one-shot kernel statistics samples

mod format;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kstat_core::application::Sampler;
use kstat_core::domain::Pid;
use kstat_core::port::SystemClock;
use kstat_infra_procfs::{ProcfsKernelStats, DEFAULT_PROC_ROOT};

#[derive(Parser)]
#[command(name = "kstat")]
#[command(about = "Kernel statistics sampler", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// procfs mount point
    #[arg(long, global = true, env = "KSTAT_PROC_ROOT", default_value = DEFAULT_PROC_ROOT)]
    proc_root: PathBuf,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// CPU ticks split into user / system / idle
    Cpu {
        /// Measure ticks spent over this many milliseconds instead of since boot
        #[arg(short, long)]
        delta_ms: Option<u64>,
    },

    /// Memory usage, including swap
    Memory,

    /// Swap space usage
    Swap,

    /// Installed physical memory
    Physical,

    /// CPU time and memory of one process
    Process {
        /// Process id
        pid: i32,
    },

    /// Online CPUs
    Cpus,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(title: &str, rows: Vec<format::Row>) {
    println!("{}", title.cyan().bold());
    println!("{}", format::table(rows));
}

fn run(cli: Cli) -> Result<()> {
    let kernel = Arc::new(ProcfsKernelStats::with_root(&cli.proc_root));
    let sampler = Sampler::new(kernel, Arc::new(SystemClock));

    match cli.command {
        Commands::Cpu { delta_ms } => {
            let sample = match delta_ms {
                Some(ms) => sampler
                    .delta_sample_cpu_load(Duration::from_millis(ms))
                    .context("Failed to take delta CPU sample")?,
                None => sampler.sample_cpu_load().context("Failed to sample CPU")?,
            };
            let times = sampler.cpu_times(&sample)?;

            if cli.json {
                print_json(&json!({
                    "sample": sample,
                    "times": times,
                    "busy_percent": sample.busy_percent(),
                }))?;
            } else {
                let title = match delta_ms {
                    Some(ms) => format!("CPU over {}ms", ms),
                    None => "CPU since boot".to_string(),
                };
                print_table(&title, format::cpu_rows(&sample, &times));
            }
        }

        Commands::Memory => {
            let sample = sampler
                .sample_memory_usage()
                .context("Failed to sample memory")?;
            if cli.json {
                print_json(&sample)?;
            } else {
                print_table("Memory", format::memory_rows(&sample));
            }
        }

        Commands::Swap => {
            let swap = sampler.swap_stat().context("Failed to read swap usage")?;
            if cli.json {
                print_json(&swap)?;
            } else {
                print_table("Swap", format::swap_rows(&swap));
            }
        }

        Commands::Physical => {
            let bytes = sampler
                .physical_memory()
                .context("Failed to read physical memory")?;
            if cli.json {
                print_json(&json!({ "physical_memory": bytes }))?;
            } else {
                println!("{} {}", "Physical memory:".bold(), format::bytes(bytes));
            }
        }

        Commands::Process { pid } => {
            let pid = Pid(pid);
            let cpu = sampler
                .sample_process_cpu_load(pid)
                .with_context(|| format!("Failed to sample process {}", pid))?;
            let memory = sampler
                .sample_process_memory(pid)
                .with_context(|| format!("Failed to sample process {} memory", pid))?;

            if cli.json {
                print_json(&json!({ "pid": pid, "cpu": cpu, "memory": memory }))?;
            } else {
                print_table(&format!("Process {}", pid), format::process_rows(&cpu, &memory));
            }
        }

        Commands::Cpus => {
            let cpus = sampler.number_of_cpus();
            if cli.json {
                print_json(&json!({ "cpus": cpus }))?;
            } else {
                println!("{} {}", "Online CPUs:".bold(), cpus);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Warnings only; stdout is for samples
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("kstat=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process_with_global_flags() {
        let cli = Cli::parse_from(["kstat", "process", "42", "--json", "--proc-root", "/host/proc"]);
        assert!(cli.json);
        assert_eq!(cli.proc_root, PathBuf::from("/host/proc"));
        assert!(matches!(cli.command, Commands::Process { pid: 42 }));
    }

    #[test]
    fn test_parse_cpu_delta() {
        let cli = Cli::parse_from(["kstat", "cpu", "--delta-ms", "250"]);
        assert!(matches!(cli.command, Commands::Cpu { delta_ms: Some(250) }));
    }
}
