//! Retry policy for sale pushes.

use std::time::Duration;

/// Delay growth strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base`, `2×base`, `3×base`, …
    Linear,
    /// `base`, `2×base`, `4×base`, … capped at [`RetryPolicy::MAX_DELAY`].
    Exponential,
}

/// Bounded retry with an explicit attempt budget.
///
/// One `push` makes at most `max_attempts` requests in total (the first
/// attempt counts); only retryable failures consume the budget beyond
/// the first.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff: Backoff::Exponential,
        }
    }
}

impl RetryPolicy {
    /// Upper bound on any single inter-attempt delay.
    pub const MAX_DELAY: Duration = Duration::from_secs(60);

    pub fn new(max_attempts: u32, base_delay: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff,
        }
    }

    /// A policy that never retries. Used for interactive checkout, where
    /// keeping the cashier waiting is worse than queueing the record.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay before attempt number `next_attempt` (1-based; attempt 1 has
    /// no delay).
    pub fn delay_for(&self, next_attempt: u32) -> Duration {
        if next_attempt <= 1 {
            return Duration::ZERO;
        }
        let delay = match self.backoff {
            Backoff::Linear => self.base_delay.saturating_mul(next_attempt - 1),
            Backoff::Exponential => {
                let shift = (next_attempt - 2).min(30);
                self.base_delay.saturating_mul(1u32 << shift)
            }
        };
        delay.min(Self::MAX_DELAY)
    }
}
