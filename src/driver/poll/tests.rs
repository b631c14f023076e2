use super::poll_until;
use crate::driver::DriverError;
use std::time::{Duration, Instant};

#[test]
fn target_reached_on_first_sample() {
    let mut reads = 0;
    let r = poll_until(
        || {
            reads += 1;
            Ok(42)
        },
        42,
        0,
        Duration::from_millis(10),
        Duration::from_millis(100),
    );
    assert!(r.is_ok());
    assert_eq!(reads, 1);
}

#[test]
fn converges_after_a_few_samples() {
    let sequence = [0i64, 2500, 7500, 10000];
    let mut i = 0;
    let r = poll_until(
        || {
            let v = sequence[i];
            i += 1;
            Ok(v)
        },
        10000,
        0,
        Duration::from_millis(1),
        Duration::from_secs(5),
    );
    assert!(r.is_ok());
    assert_eq!(i, 4);
}

#[test]
fn within_tolerance_counts_as_reached() {
    let r = poll_until(
        || Ok(998),
        1000,
        3,
        Duration::from_millis(1),
        Duration::from_millis(50),
    );
    assert!(r.is_ok());
}

#[test]
fn times_out_with_bounded_reads() {
    let mut reads = 0u32;
    let started = Instant::now();
    let r = poll_until(
        || {
            reads += 1;
            Ok(0)
        },
        1,
        0,
        Duration::from_millis(50),
        Duration::from_millis(500),
    );
    let elapsed = started.elapsed();
    assert!(matches!(r, Err(DriverError::TimedOut { target: 1, .. })));
    // sample first, then deadline check: at most timeout/interval + 1 reads
    assert!(reads <= 11, "performed {} reads", reads);
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_millis(700), "took {:?}", elapsed);
}

#[test]
fn read_errors_propagate() {
    let r = poll_until(
        || Err(DriverError::NotConnected),
        0,
        0,
        Duration::from_millis(1),
        Duration::from_millis(50),
    );
    assert!(matches!(r, Err(DriverError::NotConnected)));
}
