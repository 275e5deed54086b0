// Analysis thread - consumes windows, produces results
//
// The loop runs until the run flag is cleared. Each pass reads everything the
// analysis channel holds and analyzes only the newest window; older windows
// that queued up behind a slow invocation are skipped. With nothing to read
// the thread sleeps for the configured back-off instead of spinning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{ChordAnalyzer, SpectralResult};
use crate::audio::spsc::ChannelReader;
use crate::error::{log_analysis_error, try_zeroed, AnalysisError};
use crate::pipeline::{AnalysisSettings, PipelineStats, ResultSender};

pub struct AnalysisWorker {
    analysis_rx: ChannelReader<f32>,
    result_tx: ResultSender<Box<SpectralResult>>,
    settings: Arc<AnalysisSettings>,
    running: Arc<AtomicBool>,
    stats: Arc<PipelineStats>,
    analyzer: ChordAnalyzer,
    read_buffer: Vec<f32>,
    idle_backoff: Duration,
}

impl AnalysisWorker {
    /// Create a worker around an already-built analyzer
    ///
    /// # Errors
    /// `ResourceExhausted` if the read buffer cannot be allocated
    pub fn new(
        analysis_rx: ChannelReader<f32>,
        result_tx: ResultSender<Box<SpectralResult>>,
        analyzer: ChordAnalyzer,
        settings: Arc<AnalysisSettings>,
        running: Arc<AtomicBool>,
        stats: Arc<PipelineStats>,
        idle_backoff: Duration,
    ) -> Result<Self, AnalysisError> {
        let read_buffer = try_zeroed(analysis_rx.capacity(), "analysis read buffer")?;
        Ok(Self {
            analysis_rx,
            result_tx,
            settings,
            running,
            stats,
            analyzer,
            read_buffer,
            idle_backoff,
        })
    }

    /// Analyze the newest pending window, if any.
    ///
    /// # Returns
    /// `true` if a window was analyzed
    pub fn step(&mut self) -> Result<bool, AnalysisError> {
        let window_size = self.analyzer.window_size();
        let available = self.analysis_rx.read(&mut self.read_buffer);
        if available < window_size {
            if available > 0 {
                tracing::warn!(
                    "[AnalysisThread] Discarding {} samples, short of a {}-sample window",
                    available,
                    window_size
                );
            }
            return Ok(false);
        }

        let skipped = available / window_size - 1;
        if skipped > 0 {
            tracing::debug!("[AnalysisThread] Skipping {} stale windows", skipped);
        }

        let window = &self.read_buffer[available - window_size..available];
        let params = self.settings.snapshot();
        let result = self.analyzer.analyze(window, params)?;
        self.stats.record_analysis();

        tracing::trace!(
            "[AnalysisThread] {} (confidence {:.4}, {:.2} ms)",
            result.chord_label,
            result.confidence,
            result.compute_latency_ms
        );

        if !self.result_tx.send(result) {
            self.stats.record_result_dropped();
        }
        Ok(true)
    }

    /// Run until the run flag is cleared or an analysis error occurs
    pub fn run(mut self) -> Result<(), AnalysisError> {
        tracing::info!(
            "[AnalysisThread] Starting analysis loop (window={}, sample_rate={})",
            self.analyzer.window_size(),
            self.analyzer.sample_rate()
        );

        while self.running.load(Ordering::Acquire) {
            match self.step() {
                Ok(true) => {}
                Ok(false) => thread::sleep(self.idle_backoff),
                Err(err) => {
                    log_analysis_error(&err, "AnalysisWorker::run");
                    return Err(err);
                }
            }
        }

        tracing::info!("[AnalysisThread] Run flag cleared, exiting");
        Ok(())
    }
}

/// Spawn the analysis thread
///
/// # Returns
/// JoinHandle yielding the reason the loop ended. The thread exits when
/// `running` is cleared.
pub fn spawn_analysis_thread(worker: AnalysisWorker) -> std::io::Result<JoinHandle<Result<(), AnalysisError>>> {
    thread::Builder::new()
        .name("chordy-analysis".to_string())
        .spawn(move || worker.run())
}
