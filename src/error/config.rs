// Configuration error types and constants

use crate::analysis::chroma::MAX_OCTAVE_COUNT;
use crate::error::ErrorCode;
use std::fmt;

/// Configuration error code constants
///
/// Error code range: 1001-1010
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// Sample rate must be positive
    pub const INVALID_SAMPLE_RATE: i32 = 1001;

    /// Capture frame size must be positive
    pub const INVALID_FRAME_COUNT: i32 = 1002;

    /// Analysis window must be a positive multiple of the frame size
    pub const ANALYSIS_FRAME_COUNT_NOT_MULTIPLE: i32 = 1003;

    /// History cannot hold one full capture channel
    pub const HISTORY_TOO_SMALL: i32 = 1004;

    /// Analysis window is longer than the history
    pub const ANALYSIS_WINDOW_EXCEEDS_HISTORY: i32 = 1005;

    /// Octave count must be at least 1
    pub const INVALID_OCTAVE_COUNT: i32 = 1006;

    /// Detection threshold must be finite and non-negative
    pub const INVALID_THRESHOLD: i32 = 1007;

    /// A channel was configured with zero capacity
    pub const INVALID_CHANNEL_CAPACITY: i32 = 1008;

    /// Config file could not be read or parsed
    pub const UNREADABLE: i32 = 1009;

    /// A channel size in samples does not fit in `usize`
    pub const CHANNEL_TOO_LARGE: i32 = 1010;
}

/// Configuration errors
///
/// All of these are fatal and are raised before any thread starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidSampleRate {
        sample_rate: u32,
    },
    InvalidFrameCount {
        frame_count: usize,
    },
    AnalysisFrameCountNotMultiple {
        analysis_frame_count: usize,
        frame_count: usize,
    },
    HistoryTooSmall {
        history_capacity: usize,
        required: usize,
    },
    AnalysisWindowExceedsHistory {
        analysis_frame_count: usize,
        history_capacity: usize,
    },
    InvalidOctaveCount {
        octave_count: usize,
    },
    InvalidThreshold {
        threshold: f32,
    },
    InvalidChannelCapacity {
        channel: &'static str,
    },
    Unreadable {
        path: String,
        reason: String,
    },
    ChannelTooLarge {
        channel: &'static str,
    },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::InvalidSampleRate { .. } => ConfigErrorCodes::INVALID_SAMPLE_RATE,
            ConfigError::InvalidFrameCount { .. } => ConfigErrorCodes::INVALID_FRAME_COUNT,
            ConfigError::AnalysisFrameCountNotMultiple { .. } => {
                ConfigErrorCodes::ANALYSIS_FRAME_COUNT_NOT_MULTIPLE
            }
            ConfigError::HistoryTooSmall { .. } => ConfigErrorCodes::HISTORY_TOO_SMALL,
            ConfigError::AnalysisWindowExceedsHistory { .. } => {
                ConfigErrorCodes::ANALYSIS_WINDOW_EXCEEDS_HISTORY
            }
            ConfigError::InvalidOctaveCount { .. } => ConfigErrorCodes::INVALID_OCTAVE_COUNT,
            ConfigError::InvalidThreshold { .. } => ConfigErrorCodes::INVALID_THRESHOLD,
            ConfigError::InvalidChannelCapacity { .. } => {
                ConfigErrorCodes::INVALID_CHANNEL_CAPACITY
            }
            ConfigError::Unreadable { .. } => ConfigErrorCodes::UNREADABLE,
            ConfigError::ChannelTooLarge { .. } => ConfigErrorCodes::CHANNEL_TOO_LARGE,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::InvalidSampleRate { sample_rate } => {
                format!("Sample rate must be greater than 0 (got {})", sample_rate)
            }
            ConfigError::InvalidFrameCount { frame_count } => {
                format!("Frame count must be greater than 0 (got {})", frame_count)
            }
            ConfigError::AnalysisFrameCountNotMultiple {
                analysis_frame_count,
                frame_count,
            } => format!(
                "Analysis frame count {} is not a positive multiple of frame count {}",
                analysis_frame_count, frame_count
            ),
            ConfigError::HistoryTooSmall {
                history_capacity,
                required,
            } => format!(
                "History capacity {} cannot hold a full capture channel ({} samples)",
                history_capacity, required
            ),
            ConfigError::AnalysisWindowExceedsHistory {
                analysis_frame_count,
                history_capacity,
            } => format!(
                "Analysis frame count {} exceeds history capacity {}",
                analysis_frame_count, history_capacity
            ),
            ConfigError::InvalidOctaveCount { octave_count } => {
                format!(
                    "Octave count must be between 1 and {} (got {})",
                    MAX_OCTAVE_COUNT, octave_count
                )
            }
            ConfigError::InvalidThreshold { threshold } => format!(
                "Detection threshold must be finite and non-negative (got {})",
                threshold
            ),
            ConfigError::InvalidChannelCapacity { channel } => {
                format!("Channel '{}' must have a capacity greater than 0", channel)
            }
            ConfigError::Unreadable { path, reason } => {
                format!("Failed to load config {}: {}", path, reason)
            }
            ConfigError::ChannelTooLarge { channel } => {
                format!("Channel '{}' size in samples overflows", channel)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for ConfigError {}
