//! Single-slot latest-value handoff between producer and consumer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use crossbeam::utils::CachePadded;

/// Mailbox holding at most one value.
///
/// The producer overwrites unconditionally and never blocks; the consumer
/// takes the newest value or nothing, and never blocks either. A swapped-in
/// value is always complete - there is no way to observe a half-built one.
pub struct Handoff<T> {
    slot: ArcSwapOption<T>,

    /// Statistics
    stats: CachePadded<Stats>,
}

#[derive(Default)]
struct Stats {
    published: AtomicUsize,
    taken: AtomicUsize,
    dropped: AtomicUsize,
}

impl<T> Handoff<T> {
    pub fn new() -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            stats: CachePadded::new(Stats::default()),
        }
    }

    /// Producer: store a value, discarding any unconsumed predecessor.
    pub fn publish(&self, value: T) {
        let previous = self.slot.swap(Some(Arc::new(value)));
        if previous.is_some() {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.stats.published.fetch_add(1, Ordering::Relaxed);
    }

    /// Consumer: clear and return the slot, or `None` immediately.
    pub fn try_take(&self) -> Option<Arc<T>> {
        let value = self.slot.swap(None);
        if value.is_some() {
            self.stats.taken.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// (published, taken, dropped) counts since creation.
    pub fn stats(&self) -> (usize, usize, usize) {
        (
            self.stats.published.load(Ordering::Relaxed),
            self.stats.taken.load(Ordering::Relaxed),
            self.stats.dropped.load(Ordering::Relaxed),
        )
    }
}

impl<T> Default for Handoff<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn publish_overwrites_unconsumed_values() {
        let handoff = Handoff::new();

        handoff.publish("a");
        handoff.publish("b");

        assert_eq!(*handoff.try_take().unwrap(), "b");
        // "a" is unrecoverable.
        assert!(handoff.try_take().is_none());
        assert_eq!(handoff.stats(), (2, 1, 1));
    }

    #[test]
    fn try_take_on_empty_returns_immediately() {
        let handoff: Handoff<u32> = Handoff::new();

        let started = Instant::now();
        assert!(handoff.try_take().is_none());
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn take_then_empty_until_next_publish() {
        let handoff = Handoff::new();

        handoff.publish(7u32);
        assert_eq!(*handoff.try_take().unwrap(), 7);
        assert!(handoff.try_take().is_none());

        handoff.publish(8);
        assert_eq!(*handoff.try_take().unwrap(), 8);
    }

    #[test]
    fn concurrent_producer_and_consumer_settle_on_the_last_value() {
        let handoff = Arc::new(Handoff::new());

        let producer = {
            let handoff = handoff.clone();
            thread::spawn(move || {
                for i in 0..1000u32 {
                    handoff.publish(i);
                }
            })
        };

        let consumer = {
            let handoff = handoff.clone();
            thread::spawn(move || {
                let mut last_seen = None;
                while last_seen != Some(999) {
                    if let Some(value) = handoff.try_take() {
                        // Values only move forward.
                        if let Some(prev) = last_seen {
                            assert!(*value > prev);
                        }
                        last_seen = Some(*value);
                    }
                }
            })
        };

        producer.join().unwrap();
        consumer.join().unwrap();

        let (published, taken, dropped) = handoff.stats();
        assert_eq!(published, 1000);
        assert_eq!(published, taken + dropped);
    }
}
