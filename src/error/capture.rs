// Capture error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Capture error code constants
///
/// Error code range: 4001-4003
pub struct CaptureErrorCodes {}

impl CaptureErrorCodes {
    /// No default input device is available
    pub const NO_INPUT_DEVICE: i32 = 4001;

    /// The input stream could not be opened or started
    pub const STREAM_OPEN_FAILED: i32 = 4002;

    /// Device sample format cannot be converted to f32
    pub const UNSUPPORTED_SAMPLE_FORMAT: i32 = 4003;
}

/// Log a capture error with structured context
pub fn log_capture_error(err: &CaptureError, context: &str) {
    error!(
        "Capture error in {}: code={}, component=LiveCapture, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors opening a live capture source
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    NoInputDevice,
    StreamOpenFailed { reason: String },
    UnsupportedSampleFormat { format: String },
}

impl ErrorCode for CaptureError {
    fn code(&self) -> i32 {
        match self {
            CaptureError::NoInputDevice => CaptureErrorCodes::NO_INPUT_DEVICE,
            CaptureError::StreamOpenFailed { .. } => CaptureErrorCodes::STREAM_OPEN_FAILED,
            CaptureError::UnsupportedSampleFormat { .. } => {
                CaptureErrorCodes::UNSUPPORTED_SAMPLE_FORMAT
            }
        }
    }

    fn message(&self) -> String {
        match self {
            CaptureError::NoInputDevice => "No default input device found".to_string(),
            CaptureError::StreamOpenFailed { reason } => {
                format!("Failed to open input stream: {}", reason)
            }
            CaptureError::UnsupportedSampleFormat { format } => {
                format!("Unsupported input sample format {} (expected f32)", format)
            }
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaptureError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for CaptureError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_error_codes() {
        assert_eq!(CaptureError::NoInputDevice.code(), 4001);
        assert_eq!(
            CaptureError::StreamOpenFailed {
                reason: "busy".to_string()
            }
            .code(),
            4002
        );
        let err = CaptureError::UnsupportedSampleFormat {
            format: "I16".to_string(),
        };
        assert_eq!(err.code(), 4003);
        assert!(err.to_string().contains("I16"));
    }
}
