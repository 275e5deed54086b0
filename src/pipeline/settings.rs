// Runtime-tunable analysis settings
//
// Written by the presentation thread, read by the analysis thread once per
// invocation. Relaxed ordering: a change may be seen one invocation late,
// and the two values are not required to change together.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use crate::analysis::chroma::MAX_OCTAVE_COUNT;
use crate::analysis::AnalysisParams;
use crate::config::PipelineConfig;

#[derive(Debug)]
pub struct AnalysisSettings {
    octave_count: AtomicUsize,
    /// f32 bit pattern
    detection_threshold: AtomicU32,
}

impl AnalysisSettings {
    pub fn new(octave_count: usize, detection_threshold: f32) -> Self {
        Self {
            octave_count: AtomicUsize::new(octave_count.clamp(1, MAX_OCTAVE_COUNT)),
            detection_threshold: AtomicU32::new(detection_threshold.to_bits()),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.octave_count, config.detection_threshold)
    }

    pub fn octave_count(&self) -> usize {
        self.octave_count.load(Ordering::Relaxed)
    }

    /// Set the octave count, clamped to `1..=MAX_OCTAVE_COUNT`
    pub fn set_octave_count(&self, octave_count: usize) {
        self.octave_count
            .store(octave_count.clamp(1, MAX_OCTAVE_COUNT), Ordering::Relaxed);
    }

    pub fn detection_threshold(&self) -> f32 {
        f32::from_bits(self.detection_threshold.load(Ordering::Relaxed))
    }

    /// Set the threshold; non-finite values are ignored
    pub fn set_detection_threshold(&self, threshold: f32) {
        if !threshold.is_finite() {
            tracing::warn!("[Settings] Ignoring non-finite detection threshold {}", threshold);
            return;
        }
        self.detection_threshold
            .store(threshold.to_bits(), Ordering::Relaxed);
    }

    /// Values for the next analysis invocation
    pub fn snapshot(&self) -> AnalysisParams {
        AnalysisParams {
            octave_count: self.octave_count(),
            detection_threshold: self.detection_threshold(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let params = AnalysisParams::default();
        Self::new(params.octave_count, params.detection_threshold)
    }
}
