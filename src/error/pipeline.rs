// Pipeline error types and constants

use crate::error::{AnalysisError, ConfigError, ErrorCode};
use log::error;
use std::fmt;

/// Pipeline error code constants
///
/// Error code range: 3001-3005
pub struct PipelineErrorCodes {}

impl PipelineErrorCodes {
    /// Configuration rejected at construction
    pub const CONFIG: i32 = 3001;

    /// Analyzer could not be built
    pub const ANALYSIS: i32 = 3002;

    /// Analysis thread exited while the pipeline was running
    pub const ANALYSIS_THREAD_DIED: i32 = 3003;

    /// Pipeline was used after shutdown
    pub const NOT_RUNNING: i32 = 3004;

    /// The operating system refused to start the analysis thread
    pub const THREAD_SPAWN_FAILED: i32 = 3005;
}

/// Log a pipeline error with structured context
pub fn log_pipeline_error(err: &PipelineError, context: &str) {
    error!(
        "Pipeline error in {}: code={}, component=ChordPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Pipeline orchestration errors
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Config(ConfigError),
    Analysis(AnalysisError),
    /// The analysis thread is gone; there is no restart, so the pipeline stops
    AnalysisThreadDied { reason: String },
    NotRunning,
    ThreadSpawnFailed { reason: String },
}

impl ErrorCode for PipelineError {
    fn code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => PipelineErrorCodes::CONFIG,
            PipelineError::Analysis(_) => PipelineErrorCodes::ANALYSIS,
            PipelineError::AnalysisThreadDied { .. } => PipelineErrorCodes::ANALYSIS_THREAD_DIED,
            PipelineError::NotRunning => PipelineErrorCodes::NOT_RUNNING,
            PipelineError::ThreadSpawnFailed { .. } => PipelineErrorCodes::THREAD_SPAWN_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            PipelineError::Config(err) => err.message(),
            PipelineError::Analysis(err) => err.message(),
            PipelineError::AnalysisThreadDied { reason } => {
                format!("Analysis thread stopped unexpectedly: {}", reason)
            }
            PipelineError::NotRunning => {
                "Pipeline is not running. Call ChordPipeline::start() first.".to_string()
            }
            PipelineError::ThreadSpawnFailed { reason } => {
                format!("Failed to spawn analysis thread: {}", reason)
            }
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PipelineError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Config(err) => Some(err),
            PipelineError::Analysis(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        PipelineError::Config(err)
    }
}

impl From<AnalysisError> for PipelineError {
    fn from(err: AnalysisError) -> Self {
        PipelineError::Analysis(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_codes() {
        assert_eq!(
            PipelineError::from(ConfigError::InvalidSampleRate { sample_rate: 0 }).code(),
            3001
        );
        assert_eq!(
            PipelineError::from(AnalysisError::InvalidWindowSize { size: 1 }).code(),
            3002
        );
        assert_eq!(
            PipelineError::AnalysisThreadDied {
                reason: "panic".to_string()
            }
            .code(),
            3003
        );
        assert_eq!(PipelineError::NotRunning.code(), 3004);
        assert_eq!(
            PipelineError::ThreadSpawnFailed {
                reason: "limit".to_string()
            }
            .code(),
            3005
        );
    }

    #[test]
    fn test_wrapped_error_keeps_message_and_source() {
        use std::error::Error;

        let err = PipelineError::from(ConfigError::InvalidOctaveCount { octave_count: 0 });
        assert!(err.message().contains("Octave count"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_propagation() {
        fn may_fail() -> Result<(), ConfigError> {
            Err(ConfigError::InvalidFrameCount { frame_count: 0 })
        }

        fn caller() -> Result<(), PipelineError> {
            may_fail()?;
            Ok(())
        }

        assert!(matches!(caller(), Err(PipelineError::Config(_))));
    }
}
