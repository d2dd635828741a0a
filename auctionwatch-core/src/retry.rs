// 🟡 YELLOW Phase: Minimal retry implementation
// Reconnect scheduling: fixed interval by default, optional cap and backoff

use std::time::Duration;

/// Reconnect schedule for the connection manager.
///
/// The default reproduces the reference behavior: one retry every five
/// seconds, forever. A maximum attempt count and an exponential backoff
/// curve can be opted into through configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry (and every retry when backoff is off)
    pub initial_delay: Duration,
    /// Ceiling for the backoff curve
    pub max_delay: Duration,
    /// Double the delay on every failed attempt
    pub exponential_backoff: bool,
    /// Stop retrying after this many failed attempts (None = unbounded)
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            exponential_backoff: false,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Fixed-interval schedule with no attempt cap
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            ..Self::default()
        }
    }

    /// Delay before the next attempt, given the number of attempts that
    /// have already failed. Returns None once the attempt cap is reached.
    pub fn delay_for(&self, failed_attempts: u32) -> Option<Duration> {
        if let Some(max) = self.max_attempts {
            if failed_attempts >= max {
                return None;
            }
        }

        if !self.exponential_backoff {
            return Some(self.initial_delay);
        }

        let exponential = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(failed_attempts));
        Some(exponential.min(self.max_delay))
    }
}
