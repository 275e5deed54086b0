// History assembler - turns captured frames into a chronological window
//
// Runs on the presentation thread. Each poll drains the capture channel once,
// appends the samples to a circular store, rebuilds the linear (oldest to
// newest) snapshot used for display, and forwards the newest `n` samples to
// the analysis thread.

use super::spsc::{ChannelReader, ChannelWriter};
use crate::pipeline::PipelineStats;
use std::sync::Arc;

/// Fixed-capacity circular store of the most recent samples
pub struct HistoryWindow {
    ring: Vec<f32>,
    cursor: usize,
}

impl HistoryWindow {
    /// Create a zero-filled window of `capacity` samples
    ///
    /// # Panics
    /// Panics if capacity is 0
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be greater than 0");
        Self {
            ring: vec![0.0; capacity],
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.ring.len()
    }

    /// Index the next sample will be written to
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Append samples at the cursor, wrapping once at the end of the store.
    ///
    /// Callers size their input so `samples.len() <= capacity`; longer input
    /// keeps only its newest `capacity` samples.
    pub fn extend(&mut self, samples: &[f32]) {
        let capacity = self.ring.len();
        let samples = if samples.len() > capacity {
            &samples[samples.len() - capacity..]
        } else {
            samples
        };

        let to_end = (capacity - self.cursor).min(samples.len());
        let (head, tail) = samples.split_at(to_end);
        self.ring[self.cursor..self.cursor + head.len()].copy_from_slice(head);
        self.ring[..tail.len()].copy_from_slice(tail);

        self.cursor = (self.cursor + samples.len()) % capacity;
    }

    /// Copy the ring into `out` in time order: cursor..end, then start..cursor.
    ///
    /// # Panics
    /// Panics if `out.len() != capacity`
    pub fn linearize_into(&self, out: &mut [f32]) {
        assert_eq!(out.len(), self.ring.len(), "linear buffer size mismatch");
        let older = &self.ring[self.cursor..];
        out[..older.len()].copy_from_slice(older);
        out[older.len()..].copy_from_slice(&self.ring[..self.cursor]);
    }

    /// Allocate and return a linear copy of the window
    pub fn to_linear(&self) -> Vec<f32> {
        let mut out = vec![0.0; self.ring.len()];
        self.linearize_into(&mut out);
        out
    }
}

/// Presentation-side stage between the capture channel and the analysis channel
pub struct HistoryAssembler {
    capture_rx: ChannelReader<f32>,
    analysis_tx: ChannelWriter<f32>,
    read_buffer: Vec<f32>,
    window: HistoryWindow,
    linear: Vec<f32>,
    analysis_frame_count: usize,
    stats: Arc<PipelineStats>,
}

impl HistoryAssembler {
    /// Create an assembler
    ///
    /// # Arguments
    /// * `capture_rx` - Reading half of the capture channel
    /// * `analysis_tx` - Writing half of the analysis channel
    /// * `history_capacity` - Samples kept for display (must cover one full capture channel)
    /// * `analysis_frame_count` - Samples per analysis window (must not exceed history_capacity)
    /// * `stats` - Shared pipeline counters
    pub fn new(
        capture_rx: ChannelReader<f32>,
        analysis_tx: ChannelWriter<f32>,
        history_capacity: usize,
        analysis_frame_count: usize,
        stats: Arc<PipelineStats>,
    ) -> Self {
        assert!(
            capture_rx.capacity() <= history_capacity,
            "history capacity must cover the capture channel"
        );
        assert!(
            analysis_frame_count <= history_capacity,
            "analysis window must fit in the history"
        );

        let read_buffer = vec![0.0; capture_rx.capacity()];
        Self {
            capture_rx,
            analysis_tx,
            read_buffer,
            window: HistoryWindow::new(history_capacity),
            linear: vec![0.0; history_capacity],
            analysis_frame_count,
            stats,
        }
    }

    /// Drain the capture channel and refresh the history.
    ///
    /// # Returns
    /// Number of new samples consumed this poll. A quiet poll (0) leaves the
    /// snapshot untouched and enqueues nothing.
    pub fn poll(&mut self) -> usize {
        let available = self.capture_rx.read(&mut self.read_buffer);
        if available == 0 {
            return 0;
        }

        self.window.extend(&self.read_buffer[..available]);
        self.window.linearize_into(&mut self.linear);

        let tail = &self.linear[self.linear.len() - self.analysis_frame_count..];
        if self.analysis_tx.write_all(tail) {
            self.stats.record_window_enqueued();
        } else {
            self.stats.record_window_dropped();
        }

        available
    }

    /// Linear history, oldest sample first
    pub fn snapshot(&self) -> &[f32] {
        &self.linear
    }

    /// Newest `analysis_frame_count` samples of the snapshot
    pub fn analysis_window(&self) -> &[f32] {
        &self.linear[self.linear.len() - self.analysis_frame_count..]
    }

    pub fn history_capacity(&self) -> usize {
        self.window.capacity()
    }
}
