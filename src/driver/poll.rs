#[cfg(test)]
mod tests;

use super::DriverError;
use std::{
    thread,
    time::{Duration, Instant},
};
use tracing::trace;

// Samples `read` every `interval` until the value is within `tolerance` of
// `target` or `timeout` has elapsed.
//
// The first sample is taken immediately, so at most timeout/interval + 1
// reads happen. A read error aborts the wait and propagates. With tolerance
// 0 the comparison is the exact integer equality of the encoder counts,
// which is what the protocol specifies.
pub(crate) fn poll_until<F>(
    mut read: F,
    target: i64,
    tolerance: i64,
    interval: Duration,
    timeout: Duration,
) -> Result<(), DriverError>
where
    F: FnMut() -> Result<i64, DriverError>,
{
    let start = Instant::now();
    loop {
        let value = read()?;
        trace!(value, target, "poll sample");
        if (value - target).abs() <= tolerance {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(DriverError::TimedOut { target, timeout });
        }
        thread::sleep(interval);
    }
}
