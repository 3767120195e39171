// sysconf(3) values the adapter needs
// reason: nix for safe sysconf wrappers

use kstat_core::Result;

#[cfg(target_os = "linux")]
mod imp {
    use super::Result;
    use kstat_core::SampleError;
    use nix::unistd::{sysconf, SysconfVar};

    fn query(var: SysconfVar, name: &'static str) -> Result<u64> {
        match sysconf(var) {
            Ok(Some(value)) if value > 0 => Ok(value as u64),
            Ok(_) => Err(SampleError::Sysconf(name)),
            Err(errno) => Err(SampleError::Io(std::io::Error::from(errno))),
        }
    }

    pub fn clock_ticks_per_second() -> Result<u64> {
        query(SysconfVar::CLK_TCK, "_SC_CLK_TCK")
    }

    pub fn page_size() -> Result<u64> {
        query(SysconfVar::PAGE_SIZE, "_SC_PAGESIZE")
    }

    pub fn online_cpus() -> Result<u64> {
        query(SysconfVar::_NPROCESSORS_ONLN, "_SC_NPROCESSORS_ONLN")
    }
}

#[cfg(not(target_os = "linux"))]
mod imp {
    use super::Result;
    use kstat_core::SampleError;

    pub fn clock_ticks_per_second() -> Result<u64> {
        Err(SampleError::Unsupported("procfs adapter requires Linux"))
    }

    pub fn page_size() -> Result<u64> {
        Err(SampleError::Unsupported("procfs adapter requires Linux"))
    }

    pub fn online_cpus() -> Result<u64> {
        Err(SampleError::Unsupported("procfs adapter requires Linux"))
    }
}

pub use imp::{clock_ticks_per_second, online_cpus, page_size};

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_live_values() {
        assert!(clock_ticks_per_second().unwrap() >= 1);
        assert!(page_size().unwrap().is_power_of_two());
        assert!(online_cpus().unwrap() >= 1);
    }
}
