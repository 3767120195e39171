//! Daemon configuration from `KSTAT_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use kstat_core::application::monitor::constants::{DEFAULT_CPU_WINDOW, DEFAULT_SAMPLE_INTERVAL};
use kstat_core::application::MonitorConfig;
use kstat_core::domain::Pid;
use kstat_infra_procfs::DEFAULT_PROC_ROOT;

pub const ENV_INTERVAL_MS: &str = "KSTAT_INTERVAL_MS";
pub const ENV_CPU_WINDOW_MS: &str = "KSTAT_CPU_WINDOW_MS";
pub const ENV_WATCH_PIDS: &str = "KSTAT_WATCH_PIDS";
pub const ENV_PROC_ROOT: &str = "KSTAT_PROC_ROOT";
pub const ENV_LOG_FORMAT: &str = "KSTAT_LOG_FORMAT";
pub const ENV_LOG_DIR: &str = "KSTAT_LOG_DIR";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("KSTAT_CPU_WINDOW_MS ({window_ms}ms) must be shorter than KSTAT_INTERVAL_MS ({interval_ms}ms)")]
    WindowTooLong { window_ms: u128, interval_ms: u128 },

    #[error("KSTAT_WATCH_PIDS entry {0:?} is not a valid pid")]
    InvalidPid(String),

    #[error("KSTAT_LOG_FORMAT must be \"pretty\" or \"json\", got {0:?}")]
    InvalidLogFormat(String),
}

/// Log output format on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Development: pretty formatting with colors
    #[default]
    Pretty,
    /// Production: JSON structured logging
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaemonConfig {
    pub monitor: MonitorConfig,
    pub proc_root: PathBuf,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source (tests pass a map)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let interval = millis(&lookup, ENV_INTERVAL_MS)?.unwrap_or(DEFAULT_SAMPLE_INTERVAL);
        let cpu_window = millis(&lookup, ENV_CPU_WINDOW_MS)?.unwrap_or(DEFAULT_CPU_WINDOW);
        if cpu_window >= interval {
            return Err(ConfigError::WindowTooLong {
                window_ms: cpu_window.as_millis(),
                interval_ms: interval.as_millis(),
            });
        }

        let watch_pids = match lookup(ENV_WATCH_PIDS) {
            Some(list) => parse_pids(&list)?,
            None => Vec::new(),
        };

        let log_format = match lookup(ENV_LOG_FORMAT).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        let proc_root = lookup(ENV_PROC_ROOT)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT));

        let log_dir = lookup(ENV_LOG_DIR)
            .filter(|dir| !dir.is_empty())
            .map(|dir| PathBuf::from(shellexpand::tilde(&dir).into_owned()));

        Ok(Self {
            monitor: MonitorConfig {
                interval,
                cpu_window,
                watch_pids,
            },
            proc_root,
            log_format,
            log_dir,
        })
    }
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(ms) if ms > 0 => Ok(Some(Duration::from_millis(ms))),
            _ => Err(ConfigError::InvalidNumber { name, value }),
        },
    }
}

fn parse_pids(list: &str) -> Result<Vec<Pid>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.parse::<i32>() {
            Ok(raw) if raw > 0 => Ok(Pid(raw)),
            _ => Err(ConfigError::InvalidPid(entry.to_string())),
        })
        .collect()
}
