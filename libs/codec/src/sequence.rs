//! Per-payload-type sequence counters
//!
//! Each payload type owns one `static` [`SequenceCounter`], reached through
//! [`SensorPayload::sequence`](crate::SensorPayload::sequence). Counters start
//! at zero on first use, are shared by every publisher in the process, and
//! wrap at `u32::MAX`.

use std::sync::atomic::{AtomicU32, Ordering};

/// Lock-free monotonically increasing counter
#[derive(Debug)]
pub struct SequenceCounter {
    next: AtomicU32,
}

impl SequenceCounter {
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(0),
        }
    }

    /// Claim the next sequence number
    #[inline]
    pub fn next(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Value the next call to [`next`](Self::next) would return
    pub fn current(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counter_starts_at_zero() {
        let counter = SequenceCounter::new();
        assert_eq!(counter.next(), 0);
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn test_concurrent_claims_are_unique_and_dense() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 5_000;

        let counter = Arc::new(SequenceCounter::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || (0..PER_THREAD).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value), "duplicate sequence {}", value);
            }
        }

        let total = (THREADS * PER_THREAD) as u32;
        assert_eq!(seen.len() as u32, total);
        assert!((0..total).all(|v| seen.contains(&v)));
    }

    #[test]
    fn test_counter_wraps() {
        let counter = SequenceCounter {
            next: AtomicU32::new(u32::MAX),
        };
        assert_eq!(counter.next(), u32::MAX);
        assert_eq!(counter.next(), 0);
    }
}
