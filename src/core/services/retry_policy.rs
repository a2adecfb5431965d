use std::time::Duration;

/// Retry schedule for transient remote failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, no waiting.
    #[cfg(test)]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay after failed attempt number `attempt` (1-based): doubling from
    /// `base_delay`, raised to `retry_after` when the server asked for more,
    /// never above `max_delay`.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let backoff = self.base_delay.saturating_mul(factor);
        let wanted = match retry_after {
            Some(server) => backoff.max(server),
            None => backoff,
        };
        wanted.min(self.max_delay)
    }
}
