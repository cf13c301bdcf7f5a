//! # Concurrent Sequence Stamping
//!
//! Kept in its own test binary: this must be the only code stamping lidar
//! envelopes in the process, so the observed sequence range is exactly the
//! set this test produced.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use codec::{Envelope, LidarScanData};

#[test]
fn test_concurrent_envelopes_get_dense_unique_sequences() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 2_000;

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..PER_THREAD)
                    .map(|i| {
                        let scan = LidarScanData::new(format!("lidar_{}", t), i as u64, 1, 1.0);
                        Envelope::new(scan).header().sequence_number
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for sequence in handle.join().unwrap() {
            assert!(seen.insert(sequence), "duplicate sequence {}", sequence);
        }
    }
    assert_eq!(seen.len(), THREADS * PER_THREAD);

    let min = *seen.iter().min().unwrap();
    let max = *seen.iter().max().unwrap();
    assert_eq!(min, 0);
    assert_eq!((max - min) as usize + 1, THREADS * PER_THREAD);
}
