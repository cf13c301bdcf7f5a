//! Monotonic nanosecond clock for message stamping
//!
//! The first call anchors a monotonic [`Instant`] to the wall clock; every
//! later timestamp is `anchor_wall_ns + elapsed`. Values never go backwards
//! within a process (wall-clock steps after the anchor are ignored), and stay
//! comparable across processes to the accuracy of the initial wall reading.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

struct ClockAnchor {
    instant: Instant,
    wall_ns: u64,
}

static ANCHOR: OnceLock<ClockAnchor> = OnceLock::new();

fn anchor() -> &'static ClockAnchor {
    ANCHOR.get_or_init(|| ClockAnchor {
        instant: Instant::now(),
        // Pre-epoch clocks collapse to 0 rather than failing the process
        wall_ns: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0),
    })
}

/// Current monotonic timestamp in nanoseconds since the Unix epoch
pub fn timestamp_ns() -> u64 {
    let anchor = anchor();
    let elapsed = u64::try_from(anchor.instant.elapsed().as_nanos()).unwrap_or(u64::MAX);
    anchor.wall_ns.saturating_add(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_never_go_backwards() {
        let mut previous = timestamp_ns();
        for _ in 0..10_000 {
            let now = timestamp_ns();
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn test_timestamp_is_near_wall_clock() {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos() as u64;
        let stamped = timestamp_ns();
        let drift = stamped.abs_diff(wall);
        assert!(drift < 5_000_000_000, "drift {}ns", drift);
    }
}
