//! Client-level retry policy for transient failures.
//!
//! This covers automatic retry of idempotent calls (fetch, list) on
//! timeouts and 5xx responses. The bounded per-item delete retry of the
//! lifecycle layer is deliberately separate: deletes are retried there
//! with a fixed backoff and their exhaustion is reported per item, not
//! surfaced as a client error.

use std::time::Duration;

use rand::Rng;

use crate::error::ApiError;

/// Retry decision result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after a delay.
    RetryAfter(Duration),
    /// Do not retry.
    DoNotRetry,
}

/// Retry strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Never retry.
    Never,
    /// Retry only for idempotent operations.
    IdempotentOnly,
    /// Retry regardless of idempotency.
    Always,
}

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    pub max_attempts: usize,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum jitter added to each delay.
    pub max_jitter: Duration,
    /// Retry strategy.
    pub strategy: RetryStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(4),
            max_jitter: Duration::from_millis(100),
            strategy: RetryStrategy::IdempotentOnly,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries, for callers that own their own
    /// retry accounting.
    #[must_use]
    pub const fn never() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            max_jitter: Duration::from_millis(0),
            strategy: RetryStrategy::Never,
        }
    }

    /// Decide whether to retry based on the error and attempt count.
    #[must_use]
    pub fn decide(&self, error: &ApiError, attempt: usize, idempotent: bool) -> RetryDecision {
        if attempt >= self.max_attempts || !error.is_retryable() {
            return RetryDecision::DoNotRetry;
        }

        match self.strategy {
            RetryStrategy::Never => RetryDecision::DoNotRetry,
            RetryStrategy::IdempotentOnly if !idempotent => RetryDecision::DoNotRetry,
            _ => RetryDecision::RetryAfter(self.delay_for(attempt)),
        }
    }

    fn delay_for(&self, attempt: usize) -> Duration {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let exp = 2_u64.saturating_pow(u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX));
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);
        let delay_ms = base_ms.saturating_mul(exp).min(max_ms);
        let jitter_ms = if self.max_jitter.as_millis() > 0 {
            let jitter_max = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
            rand::thread_rng().gen_range(0..=jitter_max)
        } else {
            0
        };
        Duration::from_millis(delay_ms + jitter_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn server_error() -> ApiError {
        ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        }
    }

    fn policy_without_jitter(max_attempts: usize, strategy: RetryStrategy) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            max_jitter: Duration::from_millis(0),
            strategy,
        }
    }

    #[test]
    fn retries_idempotent_server_error_with_backoff() {
        let policy = policy_without_jitter(3, RetryStrategy::IdempotentOnly);
        assert_eq!(
            policy.decide(&server_error(), 1, true),
            RetryDecision::RetryAfter(Duration::from_millis(100))
        );
        assert_eq!(
            policy.decide(&server_error(), 2, true),
            RetryDecision::RetryAfter(Duration::from_millis(200))
        );
        assert_eq!(
            policy.decide(&server_error(), 3, true),
            RetryDecision::DoNotRetry
        );
    }

    #[test]
    fn does_not_retry_non_idempotent_calls() {
        let policy = policy_without_jitter(3, RetryStrategy::IdempotentOnly);
        assert_eq!(
            policy.decide(&server_error(), 1, false),
            RetryDecision::DoNotRetry
        );
    }

    #[test]
    fn does_not_retry_non_retryable_errors() {
        let policy = policy_without_jitter(3, RetryStrategy::Always);
        let not_found = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        };
        assert_eq!(
            policy.decide(&not_found, 1, true),
            RetryDecision::DoNotRetry
        );
    }

    #[test]
    fn never_policy_does_not_retry() {
        let policy = RetryPolicy::never();
        assert_eq!(
            policy.decide(&server_error(), 1, true),
            RetryDecision::DoNotRetry
        );
    }

    #[test]
    fn backoff_is_capped_at_max_delay() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(400),
            max_delay: Duration::from_secs(1),
            max_jitter: Duration::from_millis(0),
            strategy: RetryStrategy::Always,
        };
        assert_eq!(
            policy.decide(&server_error(), 5, true),
            RetryDecision::RetryAfter(Duration::from_secs(1))
        );
    }
}
