// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Retry Runner (C1) policy. An explicit struct instead of a closure over
// magic numbers, per design note: callers can inspect and log the policy
// that produced a given backoff.

use std::time::Duration;

/// Exponential backoff with a ceiling. `delay(attempt) = min(initial *
/// base^(attempt-1), max_delay)`, `attempt` is 1-indexed.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub base: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            base: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before attempt number `attempt` (1-indexed: the delay
    /// preceding the *next* try after a failed attempt `attempt`).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.base.powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_delay.as_millis() as f64) * exp;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    pub fn is_last_attempt(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

/// Whether a given failure is worth retrying at all. Retryable failures
/// are transient (network, rate limit); non-retryable ones (bad input,
/// auth) should fail fast.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for crate::domain::llm::LlmError {
    fn is_retryable(&self) -> bool {
        use crate::domain::llm::LlmError::*;
        matches!(self, Network(_) | RateLimit | Provider(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_exponentially_until_cap() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            base: 2.0,
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(800));
        // attempt 5 would be 1600ms uncapped, ceiling applies
        assert_eq!(policy.delay_for_attempt(5), Duration::from_millis(1000));
    }

    #[test]
    fn last_attempt_detection() {
        let policy = RetryPolicy::default();
        assert!(!policy.is_last_attempt(1));
        assert!(!policy.is_last_attempt(2));
        assert!(policy.is_last_attempt(3));
        assert!(policy.is_last_attempt(4));
    }

    #[test]
    fn llm_error_retryability() {
        use crate::domain::llm::LlmError;
        assert!(LlmError::Network("timeout".into()).is_retryable());
        assert!(LlmError::RateLimit.is_retryable());
        assert!(!LlmError::Authentication.is_retryable());
        assert!(!LlmError::InvalidInput("bad schema".into()).is_retryable());
    }
}
