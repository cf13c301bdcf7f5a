//! Sliced readiness waits shared by send and receive
//!
//! Blocking operations never sleep longer than [`POLL_SLICE`] at a time, so
//! cancellation and shutdown are observed promptly even when the readiness
//! notification they race against never fires.

use std::time::{Duration, Instant};

/// Longest single wait between readiness/cancellation checks
pub const POLL_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    started: Instant,
    timeout: Option<Duration>,
}

impl Deadline {
    /// `None` waits forever
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            timeout,
        }
    }

    /// Length of the next wait, or `None` once the timeout has elapsed
    pub fn next_slice(&self) -> Option<Duration> {
        match self.timeout {
            None => Some(POLL_SLICE),
            Some(timeout) => {
                let elapsed = self.started.elapsed();
                if elapsed >= timeout {
                    None
                } else {
                    Some((timeout - elapsed).min(POLL_SLICE))
                }
            }
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout
            .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}
