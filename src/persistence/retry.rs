use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(100);
/// Upper bound accepted from configuration; keeps the doubling far from overflow.
pub const MAX_RETRIES_LIMIT: u32 = 16;

/// Retry schedule for failed saves: `base * 2^n` before retry `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the failed attempt numbered `retry` (0-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    /// Sum of every backoff delay when all retries are used.
    #[must_use]
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_retries).fold(Duration::ZERO, |total, retry| {
            total.saturating_add(self.delay_for(retry))
        })
    }
}
