// Central Error Type for sampling

use thiserror::Error;

/// Sampling error type
///
/// Kernel failures are never translated: an `Io` error carries the OS error
/// code exactly as the kernel reported it (`raw_os_error()`).
#[derive(Error, Debug)]
pub enum SampleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed {source_name}: {detail}")]
    Parse {
        source_name: &'static str,
        detail: String,
    },

    #[error("sysconf({0}) is not available")]
    Sysconf(&'static str),

    #[error("Unsupported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SampleError {
    pub fn parse(source_name: &'static str, detail: impl Into<String>) -> Self {
        SampleError::Parse {
            source_name,
            detail: detail.into(),
        }
    }

    /// OS error code, when the failure came from the kernel
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            SampleError::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

/// Result type alias using SampleError
pub type Result<T> = std::result::Result<T, SampleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_error_passes_through() {
        let err: SampleError = std::io::Error::from_raw_os_error(3).into();
        assert_eq!(err.raw_os_error(), Some(3));
    }

    #[test]
    fn test_parse_error_has_no_os_code() {
        let err = SampleError::parse("/proc/stat", "missing cpu line");
        assert_eq!(err.raw_os_error(), None);
        assert_eq!(err.to_string(), "Malformed /proc/stat: missing cpu line");
    }
}
