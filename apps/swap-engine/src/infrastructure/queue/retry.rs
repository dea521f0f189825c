//! Retry policy with exponential backoff for failed execution jobs.

use std::time::Duration;

/// Retry policy applied per job by the worker pool.
///
/// The delay before redelivery of attempt `n` (0-indexed) is
/// `min(base_delay * 2^n, cap_delay)`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of execution attempts per job.
    pub max_retries: u32,
    /// Initial backoff delay.
    pub base_delay: Duration,
    /// Upper bound on the backoff delay.
    pub cap_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            cap_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with custom settings.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration, cap_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            cap_delay,
        }
    }

    /// True if a job that has made `attempts_made` attempts gets another one.
    #[must_use]
    pub const fn allows_retry(&self, attempts_made: u32) -> bool {
        attempts_made + 1 < self.max_retries
    }

    /// Backoff delay before redelivering attempt `attempts_made`.
    #[must_use]
    pub fn delay_for(&self, attempts_made: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempts_made);
        self.base_delay
            .saturating_mul(multiplier)
            .min(self.cap_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_the_cap() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(8000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(10_000));
        assert_eq!(policy.delay_for(10), Duration::from_millis(10_000));
    }

    #[test]
    fn retry_budget_counts_the_first_attempt() {
        let policy = RetryPolicy::default();

        // Three attempts total: attempts 0 and 1 may retry, attempt 2 may not.
        assert!(policy.allows_retry(0));
        assert!(policy.allows_retry(1));
        assert!(!policy.allows_retry(2));
    }

    #[test]
    fn huge_attempt_count_does_not_overflow() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(10_000));
    }
}
