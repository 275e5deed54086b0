// Error types for the chord detection pipeline
//
// This module defines custom error types for configuration, analysis,
// pipeline and capture operations, each carrying a stable numeric code.

mod analysis;
mod capture;
mod config;
mod pipeline;

pub use analysis::{log_analysis_error, AnalysisError, AnalysisErrorCodes};
pub use capture::{log_capture_error, CaptureError, CaptureErrorCodes};
pub use config::{ConfigError, ConfigErrorCodes};
pub use pipeline::{log_pipeline_error, PipelineError, PipelineErrorCodes};

pub(crate) use analysis::try_zeroed;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
