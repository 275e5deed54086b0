//! Capture input - the push interface handed to the real-time audio source
//!
//! The capture callback owns a [`CaptureSink`] and calls
//! [`CaptureSink::push_frame`] once per delivered block. The sink does one
//! all-or-nothing copy into the capture channel and nothing else:
//! - No heap allocations
//! - No locks (only a relaxed atomic counter on drop)
//! - No blocking
//!
//! Sources whose callbacks deliver blocks of varying size go through a
//! [`FrameChunker`], which regroups them into exact `frame_count` frames.

use std::sync::Arc;

use super::spsc::ChannelWriter;
use crate::pipeline::PipelineStats;

/// Real-time safe writer for captured audio frames
pub struct CaptureSink {
    tx: ChannelWriter<f32>,
    frame_count: usize,
    stats: Arc<PipelineStats>,
}

impl CaptureSink {
    pub(crate) fn new(tx: ChannelWriter<f32>, frame_count: usize, stats: Arc<PipelineStats>) -> Self {
        Self {
            tx,
            frame_count,
            stats,
        }
    }

    /// Enqueue one frame of mono samples.
    ///
    /// # Returns
    /// `true` if the frame was enqueued; `false` if the channel had no room
    /// for the whole frame, in which case the frame is dropped.
    pub fn push_frame(&mut self, samples: &[f32]) -> bool {
        let written = self.tx.write_all(samples);
        if !written {
            self.stats.record_frame_dropped();
        }
        written
    }

    /// Samples per frame expected by the pipeline
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// True once the pipeline has shut down and dropped the reading half
    pub fn is_closed(&self) -> bool {
        self.tx.is_abandoned()
    }
}

/// Regroups arbitrarily sized sample blocks into fixed-size frames
///
/// All storage is allocated up front, so [`FrameChunker::push`] is safe to
/// call from an audio callback.
pub struct FrameChunker {
    sink: CaptureSink,
    pending: Vec<f32>,
    filled: usize,
}

impl FrameChunker {
    pub fn new(sink: CaptureSink) -> Self {
        let pending = vec![0.0; sink.frame_count()];
        Self {
            sink,
            pending,
            filled: 0,
        }
    }

    /// Feed a block of samples, forwarding every completed frame to the sink
    ///
    /// # Returns
    /// Number of complete frames forwarded during this call (dropped or not)
    pub fn push(&mut self, mut samples: &[f32]) -> usize {
        let mut frames = 0;
        while !samples.is_empty() {
            let space = self.pending.len() - self.filled;
            let take = space.min(samples.len());
            self.pending[self.filled..self.filled + take].copy_from_slice(&samples[..take]);
            self.filled += take;
            samples = &samples[take..];

            if self.filled == self.pending.len() {
                self.sink.push_frame(&self.pending);
                self.filled = 0;
                frames += 1;
            }
        }
        frames
    }

    /// Feed an interleaved multi-channel block, keeping only the first channel
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize) -> usize {
        if channels <= 1 {
            return self.push(data);
        }
        let mut frames = 0;
        for frame in data.chunks(channels) {
            frames += self.push(&frame[..1]);
        }
        frames
    }

    pub fn sink(&self) -> &CaptureSink {
        &self.sink
    }
}
