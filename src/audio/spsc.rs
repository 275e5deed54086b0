// SPSC channel - bounded lock-free transport between exactly two threads
//
// Thin wrapper around rtrb's ring buffer that gives every cross-thread hop in
// the pipeline the same contract:
// - write/read never block and never allocate
// - a full channel accepts only what fits; the rest is dropped silently
// - an empty channel reads 0 items immediately
//
// Single-writer/single-reader discipline is enforced by ownership: the writer
// and reader halves are `Send` but neither is `Clone` nor `Sync`.

use rtrb::{Consumer, Producer, RingBuffer};

/// Create a bounded channel holding at most `capacity` items.
///
/// # Panics
/// Panics if capacity is 0
pub fn channel<T>(capacity: usize) -> (ChannelWriter<T>, ChannelReader<T>) {
    assert!(capacity > 0, "channel capacity must be greater than 0");
    let (producer, consumer) = RingBuffer::new(capacity);
    (
        ChannelWriter { producer, capacity },
        ChannelReader { consumer, capacity },
    )
}

/// Writing half of a bounded SPSC channel
pub struct ChannelWriter<T> {
    producer: Producer<T>,
    capacity: usize,
}

impl<T> ChannelWriter<T> {
    /// Move one item into the channel.
    ///
    /// When the channel is full the item is handed back untouched so the
    /// caller decides how it gets released.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        self.producer.push(item).map_err(|err| match err {
            rtrb::PushError::Full(item) => item,
        })
    }

    /// Number of items that can currently be written without dropping
    pub fn free_slots(&self) -> usize {
        self.producer.slots()
    }

    /// Total number of items the channel can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the reading half has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.producer.is_abandoned()
    }
}

impl<T: Copy> ChannelWriter<T> {
    /// Copy as many leading items as fit into the channel.
    ///
    /// # Returns
    /// Number of items written; items beyond the free space are dropped.
    pub fn write(&mut self, items: &[T]) -> usize {
        let count = items.len().min(self.producer.slots());
        if count == 0 {
            return 0;
        }
        match self.producer.write_chunk_uninit(count) {
            Ok(chunk) => chunk.fill_from_iter(items[..count].iter().copied()),
            Err(_) => 0,
        }
    }

    /// Copy all items or none of them.
    ///
    /// Used where a partial write would split a unit of data, such as one
    /// capture frame or one analysis window.
    pub fn write_all(&mut self, items: &[T]) -> bool {
        if items.is_empty() {
            return true;
        }
        match self.producer.write_chunk_uninit(items.len()) {
            Ok(chunk) => chunk.fill_from_iter(items.iter().copied()) == items.len(),
            Err(_) => false,
        }
    }
}

/// Reading half of a bounded SPSC channel
pub struct ChannelReader<T> {
    consumer: Consumer<T>,
    capacity: usize,
}

impl<T> ChannelReader<T> {
    /// Take the oldest item, if any
    pub fn pop(&mut self) -> Option<T> {
        self.consumer.pop().ok()
    }

    /// Number of items currently waiting to be read
    pub fn available_to_read(&self) -> usize {
        self.consumer.slots()
    }

    /// Total number of items the channel can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the writing half has been dropped
    pub fn is_abandoned(&self) -> bool {
        self.consumer.is_abandoned()
    }
}

impl<T: Copy> ChannelReader<T> {
    /// Copy up to `buffer.len()` items out of the channel in FIFO order.
    ///
    /// # Returns
    /// Number of items read (0 when the channel is empty)
    pub fn read(&mut self, buffer: &mut [T]) -> usize {
        let count = buffer.len().min(self.consumer.slots());
        if count == 0 {
            return 0;
        }
        match self.consumer.read_chunk(count) {
            Ok(chunk) => {
                let (first, second) = chunk.as_slices();
                buffer[..first.len()].copy_from_slice(first);
                buffer[first.len()..first.len() + second.len()].copy_from_slice(second);
                chunk.commit_all();
                count
            }
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_write_then_read_preserves_fifo_order() {
        let (mut tx, mut rx) = channel::<f32>(8);
        let items = [1.0, 2.0, 3.0, 4.0, 5.0];

        assert_eq!(tx.write(&items), 5);
        assert_eq!(rx.available_to_read(), 5);

        let mut out = [0.0; 8];
        assert_eq!(rx.read(&mut out), 5);
        assert_eq!(&out[..5], &items);
        assert_eq!(rx.available_to_read(), 0);
    }

    #[test]
    fn test_overfull_burst_keeps_first_capacity_items() {
        let capacity = 6;
        let extra = 4;
        let (mut tx, mut rx) = channel::<u32>(capacity);
        let burst: Vec<u32> = (0..(capacity + extra) as u32).collect();

        assert_eq!(tx.write(&burst), capacity);

        let mut out = vec![0u32; capacity + extra];
        assert_eq!(rx.read(&mut out), capacity);
        assert_eq!(&out[..capacity], &burst[..capacity]);
    }

    #[test]
    fn test_read_empty_returns_zero() {
        let (_tx, mut rx) = channel::<f32>(4);
        let mut out = [0.0; 4];
        assert_eq!(rx.read(&mut out), 0);
        assert!(rx.pop().is_none());
    }

    #[test]
    fn test_read_respects_buffer_length() {
        let (mut tx, mut rx) = channel::<u8>(8);
        tx.write(&[1, 2, 3, 4, 5]);

        let mut out = [0u8; 2];
        assert_eq!(rx.read(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(rx.available_to_read(), 3);
    }

    #[test]
    fn test_wraparound_reads_in_order() {
        let (mut tx, mut rx) = channel::<u16>(5);
        let mut out = [0u16; 5];

        tx.write(&[1, 2, 3, 4]);
        assert_eq!(rx.read(&mut out[..3]), 3);

        // Write position now wraps past the end of the ring
        assert_eq!(tx.write(&[5, 6, 7, 8]), 4);
        assert_eq!(rx.read(&mut out), 5);
        assert_eq!(out, [4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_write_all_is_all_or_nothing() {
        let (mut tx, mut rx) = channel::<f32>(4);

        assert!(tx.write_all(&[1.0, 2.0, 3.0]));
        assert!(!tx.write_all(&[4.0, 5.0]));
        assert_eq!(rx.available_to_read(), 3);
        assert_eq!(tx.free_slots(), 1);
        assert!(tx.write_all(&[]));

        let mut out = [0.0; 4];
        assert_eq!(rx.read(&mut out), 3);
    }

    #[test]
    fn test_push_hands_item_back_when_full() {
        let (mut tx, mut rx) = channel::<Box<u32>>(1);

        assert!(tx.push(Box::new(1)).is_ok());
        let rejected = tx.push(Box::new(2)).unwrap_err();
        assert_eq!(*rejected, 2);

        assert_eq!(rx.pop().map(|b| *b), Some(1));
        assert!(rx.pop().is_none());
    }

    #[test]
    fn test_abandoned_halves_are_reported() {
        let (tx, rx) = channel::<f32>(2);
        drop(rx);
        assert!(tx.is_abandoned());

        let (tx, rx) = channel::<f32>(2);
        drop(tx);
        assert!(rx.is_abandoned());
    }

    #[test]
    fn test_cross_thread_transfer_is_ordered() {
        let (mut tx, mut rx) = channel::<u32>(64);
        let total = 10_000u32;

        let producer = thread::spawn(move || {
            let mut next = 0u32;
            while next < total {
                if tx.push(next).is_ok() {
                    next += 1;
                } else {
                    thread::yield_now();
                }
            }
        });

        let mut expected = 0u32;
        let mut buffer = [0u32; 16];
        while expected < total {
            let count = rx.read(&mut buffer);
            for &value in &buffer[..count] {
                assert_eq!(value, expected);
                expected += 1;
            }
            if count == 0 {
                thread::yield_now();
            }
        }

        producer.join().unwrap();
    }

    #[test]
    fn test_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ChannelWriter<f32>>();
        assert_send::<ChannelReader<f32>>();
        assert_send::<ChannelWriter<Box<Vec<f32>>>>();
    }

    #[test]
    #[should_panic(expected = "channel capacity must be greater than 0")]
    fn test_zero_capacity_panics() {
        let _ = channel::<f32>(0);
    }
}
