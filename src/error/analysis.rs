// Analysis error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Analysis error code constants
///
/// Error code range: 2001-2003
pub struct AnalysisErrorCodes {}

impl AnalysisErrorCodes {
    /// Allocation for a result or FFT buffer failed
    pub const RESOURCE_EXHAUSTED: i32 = 2001;

    /// Window length does not match the analyzer's configured size
    pub const WINDOW_SIZE_MISMATCH: i32 = 2002;

    /// Analyzer was built with an unusable window size
    pub const INVALID_WINDOW_SIZE: i32 = 2003;
}

/// Log an analysis error with structured context
pub fn log_analysis_error(err: &AnalysisError, context: &str) {
    error!(
        "Analysis error in {}: code={}, component=ChordAnalyzer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Chord analysis errors
///
/// Silent or zero-energy windows are not errors; they produce an "N/A"
/// result. Only resource exhaustion ends the analysis thread.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Allocation failed
    ResourceExhausted { what: &'static str, requested: usize },

    /// Caller passed a window of the wrong length
    WindowSizeMismatch { expected: usize, actual: usize },

    /// Window size must be even and at least 2
    InvalidWindowSize { size: usize },
}

impl ErrorCode for AnalysisError {
    fn code(&self) -> i32 {
        match self {
            AnalysisError::ResourceExhausted { .. } => AnalysisErrorCodes::RESOURCE_EXHAUSTED,
            AnalysisError::WindowSizeMismatch { .. } => AnalysisErrorCodes::WINDOW_SIZE_MISMATCH,
            AnalysisError::InvalidWindowSize { .. } => AnalysisErrorCodes::INVALID_WINDOW_SIZE,
        }
    }

    fn message(&self) -> String {
        match self {
            AnalysisError::ResourceExhausted { what, requested } => {
                format!("Failed to allocate {} ({} elements)", what, requested)
            }
            AnalysisError::WindowSizeMismatch { expected, actual } => {
                format!("Expected a window of {} samples, got {}", expected, actual)
            }
            AnalysisError::InvalidWindowSize { size } => {
                format!("Window size must be even and at least 2 (got {})", size)
            }
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnalysisError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for AnalysisError {}

/// Allocate a zeroed buffer, reporting allocation failure instead of aborting
pub(crate) fn try_zeroed<T: Clone + Default>(
    len: usize,
    what: &'static str,
) -> Result<Vec<T>, AnalysisError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| AnalysisError::ResourceExhausted {
            what,
            requested: len,
        })?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_codes() {
        assert_eq!(
            AnalysisError::ResourceExhausted {
                what: "spectrum",
                requested: 4
            }
            .code(),
            2001
        );
        assert_eq!(
            AnalysisError::WindowSizeMismatch {
                expected: 8,
                actual: 4
            }
            .code(),
            2002
        );
        assert_eq!(AnalysisError::InvalidWindowSize { size: 3 }.code(), 2003);
    }

    #[test]
    fn test_try_zeroed_allocates_requested_length() {
        let buffer: Vec<f32> = try_zeroed(16, "test").unwrap();
        assert_eq!(buffer.len(), 16);
        assert!(buffer.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_try_zeroed_reports_impossible_allocation() {
        let err = try_zeroed::<u64>(usize::MAX / 2, "huge").unwrap_err();
        assert_eq!(err.code(), AnalysisErrorCodes::RESOURCE_EXHAUSTED);
        assert!(err.message().contains("huge"));
    }
}
