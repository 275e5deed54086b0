// Pipeline orchestrator - wires capture, assembly, analysis and presentation
//
// Three execution contexts share this pipeline:
// - Capture: owns the CaptureSink, pushes one frame per callback
// - Analysis: dedicated thread running AnalysisWorker
// - Presentation: owns ChordPipeline and calls tick() at its own cadence
//
// Data flow:
//   CaptureSink → capture channel → HistoryAssembler → analysis channel
//     → AnalysisWorker → result handoff → PresentationView

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

mod handoff;
mod settings;
mod stats;

pub use handoff::{handoff, ResultReceiver, ResultSender};
pub use settings::AnalysisSettings;
pub use stats::{PipelineStats, StatsSnapshot};

use crate::analysis::chroma::PITCH_CLASSES;
use crate::analysis::{
    spawn_analysis_thread, AnalysisWorker, Chord, ChordAnalyzer, SpectralResult, NO_CHORD_LABEL,
};
use crate::audio::capture::CaptureSink;
use crate::audio::history::HistoryAssembler;
use crate::audio::spsc;
use crate::config::PipelineConfig;
use crate::error::{log_pipeline_error, AnalysisError, PipelineError};

/// What one presentation tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Capture samples moved into the history
    pub samples_received: usize,
    /// Results that arrived since the previous tick
    pub results_received: usize,
}

impl TickReport {
    /// True if the latest result changed this tick
    pub fn has_new_result(&self) -> bool {
        self.results_received > 0
    }
}

/// Everything the presentation layer draws, borrowed from the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationView<'a> {
    pub chord_label: &'a str,
    pub chord: Option<Chord>,
    pub confidence: f32,
    /// Raw chroma of the latest result
    pub chroma: [f32; PITCH_CLASSES],
    /// Chroma scaled to sum to 1 (zeros when the total is 0)
    pub relative_chroma: [f32; PITCH_CLASSES],
    pub power_spectrum: &'a [f32],
    pub harmonic_spectrum: &'a [f32],
    /// Analysis time of the latest result, `None` before the first result
    pub compute_latency_ms: Option<f64>,
    /// Linear history, oldest sample first
    pub history: &'a [f32],
}

/// Running chord detection pipeline
pub struct ChordPipeline {
    config: PipelineConfig,
    assembler: HistoryAssembler,
    results: ResultReceiver<Box<SpectralResult>>,
    settings: Arc<AnalysisSettings>,
    stats: Arc<PipelineStats>,
    running: Arc<AtomicBool>,
    analysis_thread: Option<JoinHandle<Result<(), AnalysisError>>>,
}

impl ChordPipeline {
    /// Validate `config`, build the channels and start the analysis thread.
    ///
    /// # Returns
    /// The pipeline (kept by the presentation thread) and the capture sink
    /// (handed to the audio source).
    ///
    /// # Errors
    /// `Config` if the configuration is invalid (no thread is started),
    /// `Analysis` if the analyzer cannot be allocated,
    /// `ThreadSpawnFailed` if the analysis thread cannot be started
    pub fn start(config: PipelineConfig) -> Result<(Self, CaptureSink), PipelineError> {
        if let Err(err) = config.validate() {
            let err = PipelineError::from(err);
            log_pipeline_error(&err, "ChordPipeline::start");
            return Err(err);
        }

        let stats = Arc::new(PipelineStats::new());
        let settings = Arc::new(AnalysisSettings::from_config(&config));
        let running = Arc::new(AtomicBool::new(true));

        let (capture_tx, capture_rx) = spsc::channel(config.capture_channel_samples()?);
        let (analysis_tx, analysis_rx) = spsc::channel(config.analysis_channel_samples()?);
        let (result_tx, results) = handoff(config.result_channel_capacity);

        let analyzer = ChordAnalyzer::new(config.analysis_frame_count, config.sample_rate)?;
        let worker = AnalysisWorker::new(
            analysis_rx,
            result_tx,
            analyzer,
            Arc::clone(&settings),
            Arc::clone(&running),
            Arc::clone(&stats),
            Duration::from_micros(config.idle_backoff_us),
        )?;
        let analysis_thread = spawn_analysis_thread(worker).map_err(|err| {
            let err = PipelineError::ThreadSpawnFailed {
                reason: err.to_string(),
            };
            log_pipeline_error(&err, "ChordPipeline::start");
            err
        })?;

        let assembler = HistoryAssembler::new(
            capture_rx,
            analysis_tx,
            config.history_capacity,
            config.analysis_frame_count,
            Arc::clone(&stats),
        );
        let sink = CaptureSink::new(capture_tx, config.frame_count, Arc::clone(&stats));

        tracing::info!(
            "[ChordPipeline] Started: sample_rate={}, frame={}, window={}, history={}",
            config.sample_rate,
            config.frame_count,
            config.analysis_frame_count,
            config.history_capacity
        );

        Ok((
            Self {
                config,
                assembler,
                results,
                settings,
                stats,
                running,
                analysis_thread: Some(analysis_thread),
            },
            sink,
        ))
    }

    /// One presentation tick: assemble new capture input, then collect the
    /// freshest analysis result.
    ///
    /// # Errors
    /// `AnalysisThreadDied` the first time the analysis thread is found to
    /// have exited (the pipeline is shut down), `NotRunning` afterwards.
    pub fn tick(&mut self) -> Result<TickReport, PipelineError> {
        self.check_analysis_thread()?;

        let samples_received = self.assembler.poll();
        let results_received = self.results.drain();
        self.stats
            .record_results_superseded(results_received.saturating_sub(1) as u64);

        Ok(TickReport {
            samples_received,
            results_received,
        })
    }

    fn check_analysis_thread(&mut self) -> Result<(), PipelineError> {
        match &self.analysis_thread {
            None => return Err(PipelineError::NotRunning),
            Some(handle) if !handle.is_finished() => return Ok(()),
            Some(_) => {}
        }
        let Some(handle) = self.analysis_thread.take() else {
            return Err(PipelineError::NotRunning);
        };

        let reason = match handle.join() {
            Ok(Ok(())) => "analysis loop exited".to_string(),
            Ok(Err(err)) => err.to_string(),
            Err(_) => "analysis thread panicked".to_string(),
        };
        self.running.store(false, Ordering::Release);
        self.results.clear();

        let err = PipelineError::AnalysisThreadDied { reason };
        log_pipeline_error(&err, "ChordPipeline::tick");
        Err(err)
    }

    /// Latest result with the current history, ready to draw
    pub fn view(&self) -> PresentationView<'_> {
        let history = self.assembler.snapshot();
        match self.latest() {
            Some(result) => PresentationView {
                chord_label: &result.chord_label,
                chord: result.chord,
                confidence: result.confidence,
                chroma: result.chroma,
                relative_chroma: result.relative_chroma(),
                power_spectrum: &result.power_spectrum,
                harmonic_spectrum: &result.harmonic_spectrum,
                compute_latency_ms: Some(result.compute_latency_ms),
                history,
            },
            None => PresentationView {
                chord_label: NO_CHORD_LABEL,
                chord: None,
                confidence: 0.0,
                chroma: [0.0; PITCH_CLASSES],
                relative_chroma: [0.0; PITCH_CLASSES],
                power_spectrum: &[],
                harmonic_spectrum: &[],
                compute_latency_ms: None,
                history,
            },
        }
    }

    pub fn latest(&self) -> Option<&SpectralResult> {
        self.results.latest().map(Box::as_ref)
    }

    /// Runtime-tunable settings, shareable with other threads
    pub fn settings(&self) -> &Arc<AnalysisSettings> {
        &self.settings
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.analysis_thread.is_some()
    }

    /// Stop and join the analysis thread, then release the held result.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.analysis_thread.take() else {
            return;
        };

        self.running.store(false, Ordering::Release);
        match handle.join() {
            Ok(Ok(())) => tracing::info!("[ChordPipeline] Analysis thread stopped"),
            Ok(Err(err)) => {
                tracing::warn!("[ChordPipeline] Analysis thread had already failed: {}", err)
            }
            Err(_) => tracing::error!("[ChordPipeline] Analysis thread panicked"),
        }
        self.results.clear();
    }
}

impl Drop for ChordPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}
