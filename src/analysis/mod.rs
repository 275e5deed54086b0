// Analysis module - spectral chord recognition
//
// This module turns one window of mono samples into a chord decision and the
// spectra shown alongside it. It runs on the analysis thread, consuming
// windows produced by the history assembler and handing results to the
// presentation thread.
//
// Architecture:
// - AnalysisWorker: loop that consumes windows from the analysis channel
// - Pipeline: FftProcessor → chroma → triad scoring → thresholded decision
// - Output: Box<SpectralResult> sent through the result handoff

use std::time::Instant;

pub mod chord;
pub mod chroma;
pub mod fft;
mod worker;

pub use chord::{Chord, ChordDecision, ChordQuality, NOTE_NAMES, NO_CHORD_LABEL};
pub use worker::{spawn_analysis_thread, AnalysisWorker};

use crate::error::{try_zeroed, AnalysisError};
use chroma::PITCH_CLASSES;
use fft::FftProcessor;

/// Output of one analysis invocation
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SpectralResult {
    /// "<Note> Maj", "<Note> Min" or "N/A"
    pub chord_label: String,
    /// Detected chord, `None` for "N/A"
    #[serde(skip)]
    pub chord: Option<Chord>,
    /// Normalized score of the best triad
    pub confidence: f32,
    /// Power of bins `0..n/2`
    #[serde(skip)]
    pub power_spectrum: Vec<f32>,
    /// Harmonic display curve, n/2 values
    #[serde(skip)]
    pub harmonic_spectrum: Vec<f32>,
    /// Raw energy per pitch class, index 0 = C
    pub chroma: [f32; PITCH_CLASSES],
    /// Wall-clock time spent in `analyze`
    pub compute_latency_ms: f64,
}

impl SpectralResult {
    /// Chroma scaled to sum to 1 (all zeros for a silent window)
    pub fn relative_chroma(&self) -> [f32; PITCH_CLASSES] {
        chroma::relative_chroma(&self.chroma)
    }
}

/// Parameters that may change between invocations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisParams {
    pub octave_count: usize,
    pub detection_threshold: f32,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            octave_count: 4,
            detection_threshold: 0.016,
        }
    }
}

/// Chord analyzer for a fixed window size and sample rate
///
/// All transform state is allocated in [`ChordAnalyzer::new`]; each call to
/// [`ChordAnalyzer::analyze`] allocates only the result it returns.
pub struct ChordAnalyzer {
    fft: FftProcessor,
    sample_rate: u32,
    high_pass_bin: usize,
    power: Vec<f32>,
}

impl ChordAnalyzer {
    /// Create an analyzer for windows of `window_size` samples
    pub fn new(window_size: usize, sample_rate: u32) -> Result<Self, AnalysisError> {
        let fft = FftProcessor::new(window_size)?;
        let power = try_zeroed(fft.bin_count(), "power spectrum")?;
        Ok(Self {
            high_pass_bin: chroma::high_pass_bin(window_size, sample_rate),
            fft,
            sample_rate,
            power,
        })
    }

    pub fn window_size(&self) -> usize {
        self.fft.fft_size()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn high_pass_bin(&self) -> usize {
        self.high_pass_bin
    }

    /// Analyze one window.
    ///
    /// `octave_count` is clamped to `1..=MAX_OCTAVE_COUNT`.
    ///
    /// # Errors
    /// `WindowSizeMismatch` if `window` is not `window_size()` samples,
    /// `ResourceExhausted` if the result buffers cannot be allocated
    pub fn analyze(
        &mut self,
        window: &[f32],
        params: AnalysisParams,
    ) -> Result<Box<SpectralResult>, AnalysisError> {
        let start = Instant::now();
        let n = self.window_size();
        let half = n / 2;
        let octave_count = params.octave_count.clamp(1, chroma::MAX_OCTAVE_COUNT);

        self.fft.compute_power_spectrum(window, &mut self.power)?;

        let chroma = chroma::compute_chroma(&self.power, n, self.sample_rate, octave_count);
        let mut scores = chord::score_triads(&chroma);
        let max_power = chroma::max_power(&self.power, self.high_pass_bin, n);
        chord::normalize_scores(&mut scores, max_power);
        let decision = chord::decide(&scores, params.detection_threshold);

        let mut power_spectrum = try_zeroed(half, "result power spectrum")?;
        power_spectrum.copy_from_slice(&self.power[..half]);
        let mut harmonic_spectrum = try_zeroed(half, "result harmonic spectrum")?;
        chroma::compute_harmonic_spectrum(
            &self.power,
            self.high_pass_bin,
            octave_count,
            &mut harmonic_spectrum,
        );

        Ok(Box::new(SpectralResult {
            chord_label: decision.label(),
            chord: decision.chord,
            confidence: decision.confidence,
            power_spectrum,
            harmonic_spectrum,
            chroma,
            compute_latency_ms: start.elapsed().as_secs_f64() * 1000.0,
        }))
    }
}
