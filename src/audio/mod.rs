// Audio module - capture input and inter-thread sample transport
//
// spsc: bounded lock-free channels (rtrb) between the three threads
// capture: the real-time push interface handed to audio sources
// history: circular history and analysis window assembly
// wav: offline input for the CLI

pub mod capture;
pub mod history;
pub mod spsc;
pub mod wav;

#[cfg(feature = "live-capture")]
pub mod engine_cpal;

// Re-export commonly used types for convenience
pub use capture::{CaptureSink, FrameChunker};
pub use history::{HistoryAssembler, HistoryWindow};
pub use spsc::{channel, ChannelReader, ChannelWriter};
