// Pipeline counters shared by all three threads
//
// Drops are expected under load and are never logged as failures; they are
// only counted here. All updates are relaxed: the counters carry no ordering
// obligations for other data.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PipelineStats {
    frames_dropped: AtomicU64,
    windows_enqueued: AtomicU64,
    windows_dropped: AtomicU64,
    analyses_completed: AtomicU64,
    results_dropped: AtomicU64,
    results_superseded: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Capture frames rejected because the capture channel was full
    pub frames_dropped: u64,
    /// Analysis windows handed to the analysis thread
    pub windows_enqueued: u64,
    /// Analysis windows discarded because the analysis channel was full
    pub windows_dropped: u64,
    /// Windows the analysis thread finished
    pub analyses_completed: u64,
    /// Results released on the analysis side because the result channel was full
    pub results_dropped: u64,
    /// Results replaced by a newer one before they were presented
    pub results_superseded: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_window_enqueued(&self) {
        self.windows_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_window_dropped(&self) {
        self.windows_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis(&self) {
        self.analyses_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_result_dropped(&self) {
        self.results_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_results_superseded(&self, count: u64) {
        if count > 0 {
            self.results_superseded.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            windows_enqueued: self.windows_enqueued.load(Ordering::Relaxed),
            windows_dropped: self.windows_dropped.load(Ordering::Relaxed),
            analyses_completed: self.analyses_completed.load(Ordering::Relaxed),
            results_dropped: self.results_dropped.load(Ordering::Relaxed),
            results_superseded: self.results_superseded.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(PipelineStats::new().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate_across_threads() {
        let stats = Arc::new(PipelineStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..250 {
                        stats.record_frame_dropped();
                        stats.record_analysis();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        stats.record_results_superseded(3);
        stats.record_results_superseded(0);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_dropped, 1000);
        assert_eq!(snapshot.analyses_completed, 1000);
        assert_eq!(snapshot.results_superseded, 3);
        assert_eq!(snapshot.windows_dropped, 0);
    }

    #[test]
    fn test_snapshot_serializes_as_json() {
        let stats = PipelineStats::new();
        stats.record_window_enqueued();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["windows_enqueued"], 1);
        assert_eq!(json["results_dropped"], 0);
    }
}
