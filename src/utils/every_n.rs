use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Lets an action through at most once per interval, e.g. to keep a noisy
/// log line at `info` without flooding.
#[derive(Debug)]
pub struct EveryN {
    interval: Duration,
    last_processed: Mutex<Option<Instant>>,
}

impl EveryN {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_processed: Mutex::new(None),
        }
    }

    /// Returns true, and restarts the interval, when the last permitted
    /// call was at least `interval` before `now`.
    pub fn should_process(
        &self,
        now: Instant,
    ) -> bool {
        let mut last = self.last_processed.lock();
        match *last {
            Some(t) if now.saturating_duration_since(t) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
