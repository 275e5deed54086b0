// Result handoff - freshest result wins
//
// The analysis thread sends owned results; the presentation thread drains
// whatever arrived since its last tick and keeps only the newest. Every
// result is released exactly once by ownership: a result that cannot be
// enqueued is dropped by the sender, a superseded one by the receiver, and
// the held one when replaced or when the receiver goes away.

use crate::audio::spsc::{self, ChannelReader, ChannelWriter};

/// Create a handoff with room for `capacity` results in flight
///
/// # Panics
/// If `capacity` is 0
pub fn handoff<T>(capacity: usize) -> (ResultSender<T>, ResultReceiver<T>) {
    let (tx, rx) = spsc::channel(capacity);
    (
        ResultSender { tx },
        ResultReceiver { rx, latest: None },
    )
}

/// Analysis side of the handoff
pub struct ResultSender<T> {
    tx: ChannelWriter<T>,
}

impl<T> ResultSender<T> {
    /// Enqueue a result.
    ///
    /// # Returns
    /// `false` if the channel was full; the result is dropped immediately.
    pub fn send(&mut self, result: T) -> bool {
        self.tx.push(result).is_ok()
    }

    /// True once the receiving side is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_abandoned()
    }
}

/// Presentation side of the handoff
pub struct ResultReceiver<T> {
    rx: ChannelReader<T>,
    latest: Option<T>,
}

impl<T> ResultReceiver<T> {
    /// Drain every pending result, keeping only the newest.
    ///
    /// # Returns
    /// Number of results received. Each one but the last is released here,
    /// as is the previously held result when at least one arrived.
    pub fn drain(&mut self) -> usize {
        let mut received = 0;
        while let Some(result) = self.rx.pop() {
            self.latest = Some(result);
            received += 1;
        }
        received
    }

    /// Drain pending results; `true` if a newer result is now held
    pub fn poll(&mut self) -> bool {
        self.drain() > 0
    }

    pub fn latest(&self) -> Option<&T> {
        self.latest.as_ref()
    }

    pub fn take_latest(&mut self) -> Option<T> {
        self.latest.take()
    }

    /// Release the held result
    pub fn clear(&mut self) {
        self.latest = None;
    }

    /// True once the sending side is gone
    pub fn is_closed(&self) -> bool {
        self.rx.is_abandoned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    /// Counts how many instances have been released
    struct Tracked {
        id: usize,
        released: Arc<AtomicUsize>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tracked(id: usize, released: &Arc<AtomicUsize>) -> Tracked {
        Tracked {
            id,
            released: Arc::clone(released),
        }
    }

    #[test]
    fn test_poll_keeps_newest_and_releases_older() {
        let released = Arc::new(AtomicUsize::new(0));
        let (mut tx, mut rx) = handoff(4);

        assert!(tx.send(tracked(1, &released)));
        assert!(tx.send(tracked(2, &released)));
        assert!(tx.send(tracked(3, &released)));
        assert_eq!(rx.drain(), 3);
        assert_eq!(rx.latest().map(|r| r.id), Some(3));
        assert_eq!(released.load(Ordering::SeqCst), 2);

        // The held result is replaced and released on the next arrival
        assert!(tx.send(tracked(4, &released)));
        assert!(rx.poll());
        assert_eq!(rx.latest().map(|r| r.id), Some(4));
        assert_eq!(released.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_empty_poll_keeps_held_result() {
        let released = Arc::new(AtomicUsize::new(0));
        let (mut tx, mut rx) = handoff(2);
        tx.send(tracked(7, &released));
        assert!(rx.poll());
        assert!(!rx.poll());
        assert_eq!(rx.latest().map(|r| r.id), Some(7));
        assert_eq!(released.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_full_channel_releases_new_result() {
        let released = Arc::new(AtomicUsize::new(0));
        let (mut tx, mut rx) = handoff(1);

        assert!(tx.send(tracked(1, &released)));
        assert!(!tx.send(tracked(2, &released)));
        assert_eq!(released.load(Ordering::SeqCst), 1);

        rx.poll();
        assert_eq!(rx.latest().map(|r| r.id), Some(1));
    }

    #[test]
    fn test_take_and_clear() {
        let released = Arc::new(AtomicUsize::new(0));
        let (mut tx, mut rx) = handoff(2);
        tx.send(tracked(1, &released));
        rx.poll();

        let taken = rx.take_latest().map(|r| r.id);
        assert_eq!(taken, Some(1));
        assert!(rx.latest().is_none());

        tx.send(tracked(2, &released));
        rx.poll();
        rx.clear();
        assert!(rx.latest().is_none());
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_every_result_released_exactly_once() {
        const TOTAL: usize = 5_000;
        let released = Arc::new(AtomicUsize::new(0));
        let (mut tx, mut rx) = handoff(2);

        let producer_released = Arc::clone(&released);
        let producer = thread::spawn(move || {
            let mut dropped = 0;
            for id in 0..TOTAL {
                if !tx.send(tracked(id, &producer_released)) {
                    dropped += 1;
                }
            }
            dropped
        });

        let mut last_id = None;
        loop {
            rx.poll();
            if let Some(result) = rx.latest() {
                // Held results only move forward
                assert!(last_id.map_or(true, |last| result.id >= last));
                last_id = Some(result.id);
            }
            if producer.is_finished() && rx.drain() == 0 {
                break;
            }
        }
        let dropped = producer.join().unwrap();
        assert!(dropped < TOTAL);

        drop(rx);
        assert_eq!(released.load(Ordering::SeqCst), TOTAL);
    }
}
