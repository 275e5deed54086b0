// Chordy Core - real-time chord detection
// Lock-free capture → history → FFT chroma analysis → triad decision pipeline

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod testing;

// Re-exports for convenience
pub use analysis::{
    AnalysisParams, Chord, ChordAnalyzer, ChordQuality, SpectralResult, NO_CHORD_LABEL,
};
pub use audio::{CaptureSink, FrameChunker};
pub use config::PipelineConfig;
pub use error::{AnalysisError, CaptureError, ConfigError, ErrorCode, PipelineError};
pub use pipeline::{
    AnalysisSettings, ChordPipeline, PipelineStats, PresentationView, StatsSnapshot, TickReport,
};

use tracing_subscriber::EnvFilter;

/// Install a `tracing` fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling this more than once, or after another subscriber was installed,
/// has no effect.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();
    if installed {
        log::debug!("Logging initialized");
    }
}
