//! Configuration management for the chord detection pipeline
//!
//! The pipeline is sized once at construction from a [`PipelineConfig`].
//! Values can be loaded from a JSON file so buffer sizes and detection
//! parameters can be tuned without recompiling. Only `octave_count` and
//! `detection_threshold` can change afterwards, through
//! [`crate::pipeline::AnalysisSettings`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::chroma::MAX_OCTAVE_COUNT;
use crate::error::ConfigError;

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Samples delivered per capture callback
    pub frame_count: usize,
    /// Samples per analysis window (FFT size), a multiple of frame_count
    pub analysis_frame_count: usize,
    /// Octaves multiplied into each chroma bin
    pub octave_count: usize,
    /// Minimum normalized triad score for a chord to be reported
    pub detection_threshold: f32,
    /// Samples of history kept for display and window extraction
    pub history_capacity: usize,
    /// Frames the capture channel can buffer between presentation ticks
    pub capture_channel_frames: usize,
    /// Analysis windows the analysis channel can buffer
    pub analysis_channel_capacity: usize,
    /// Results in flight between the analysis and presentation threads
    pub result_channel_capacity: usize,
    /// Sleep of the analysis thread when no window is waiting, in microseconds
    pub idle_backoff_us: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            frame_count: 1024,
            analysis_frame_count: 8 * 1024,
            octave_count: 4,
            detection_threshold: 0.016,
            history_capacity: 256 * 1024,
            capture_channel_frames: 64,
            analysis_channel_capacity: 2,
            result_channel_capacity: 2,
            idle_backoff_us: 1_000,
        }
    }
}

impl PipelineConfig {
    /// Capture channel capacity in samples
    pub fn capture_channel_samples(&self) -> Result<usize, ConfigError> {
        self.frame_count
            .checked_mul(self.capture_channel_frames)
            .ok_or(ConfigError::ChannelTooLarge { channel: "capture" })
    }

    /// Analysis channel capacity in samples
    pub fn analysis_channel_samples(&self) -> Result<usize, ConfigError> {
        self.analysis_frame_count
            .checked_mul(self.analysis_channel_capacity)
            .ok_or(ConfigError::ChannelTooLarge {
                channel: "analysis",
            })
    }

    /// Check every sizing invariant the pipeline relies on.
    ///
    /// The history must hold a full capture channel: a single poll can drain
    /// that many samples, and anything more would be overwritten before it
    /// is linearized.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate {
                sample_rate: self.sample_rate,
            });
        }
        if self.frame_count == 0 {
            return Err(ConfigError::InvalidFrameCount {
                frame_count: self.frame_count,
            });
        }
        if self.analysis_frame_count == 0
            || self.analysis_frame_count % self.frame_count != 0
            || self.analysis_frame_count % 2 != 0
        {
            return Err(ConfigError::AnalysisFrameCountNotMultiple {
                analysis_frame_count: self.analysis_frame_count,
                frame_count: self.frame_count,
            });
        }
        if self.capture_channel_frames == 0 {
            return Err(ConfigError::InvalidChannelCapacity { channel: "capture" });
        }
        if self.analysis_channel_capacity == 0 {
            return Err(ConfigError::InvalidChannelCapacity {
                channel: "analysis",
            });
        }
        if self.result_channel_capacity == 0 {
            return Err(ConfigError::InvalidChannelCapacity { channel: "result" });
        }
        let required = self.capture_channel_samples()?;
        self.analysis_channel_samples()?;
        if self.history_capacity < required {
            return Err(ConfigError::HistoryTooSmall {
                history_capacity: self.history_capacity,
                required,
            });
        }
        if self.analysis_frame_count > self.history_capacity {
            return Err(ConfigError::AnalysisWindowExceedsHistory {
                analysis_frame_count: self.analysis_frame_count,
                history_capacity: self.history_capacity,
            });
        }
        if self.octave_count == 0 || self.octave_count > MAX_OCTAVE_COUNT {
            return Err(ConfigError::InvalidOctaveCount {
                octave_count: self.octave_count,
            });
        }
        if !self.detection_threshold.is_finite() || self.detection_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                threshold: self.detection_threshold,
            });
        }
        Ok(())
    }

    /// Load configuration from a JSON file, failing on unreadable input
    pub fn try_load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|err| ConfigError::Unreadable {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;
        log::info!("[Config] Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration from a JSON file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file is missing or
    /// invalid (a warning is logged).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("[Config] {}. Using defaults.", err);
                Self::default()
            }
        }
    }
}
