// Backoff policy for the poll loop

use std::time::Duration;

/// How long to wait before the next poll.
///
/// After `n` consecutive failures the wait is `interval * 2^n`, never more
/// than `max_delay` (and never less than `interval`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
  pub max_delay: Duration,
}

impl Default for BackoffPolicy {
  fn default() -> Self {
    Self {
      max_delay: Duration::from_secs(30),
    }
  }
}

impl BackoffPolicy {
  pub fn new(max_delay: Duration) -> Self {
    Self { max_delay }
  }

  pub fn delay(&self, interval: Duration, consecutive_failures: u32) -> Duration {
    if consecutive_failures == 0 {
      return interval;
    }
    let factor = 1u32.checked_shl(consecutive_failures.min(16)).unwrap_or(u32::MAX);
    let backed_off = interval.saturating_mul(factor);
    backed_off.min(self.max_delay.max(interval))
  }
}
