// Copyright (c) 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Retry Runner (C1) execution. Generalizes the manual retry loop found in
// the orchestrator lineage's `ProviderRegistry::generate` (sleep
// `retry_delay_ms * 2^attempt` between attempts) into a reusable helper
// any fallible async operation can be wrapped in.

use crate::domain::retry::{RetryPolicy, Retryable};
use std::future::Future;

/// Runs `operation` up to `policy.max_attempts` times, sleeping between
/// attempts per the policy's backoff, and stopping early on a
/// non-retryable error.
pub async fn run_with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && !policy.is_last_attempt(attempt) => {
                tracing::warn!(attempt, error = %err, "operation failed, retrying");
                tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[derive(Debug)]
    struct FlakyError(bool);

    impl std::fmt::Display for FlakyError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "flaky error")
        }
    }

    impl Retryable for FlakyError {
        fn is_retryable(&self) -> bool {
            self.0
        }
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            base: 2.0,
        };

        let result: Result<u32, FlakyError> = run_with_retry(&policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(FlakyError(true))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_immediately_on_non_retryable_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let result: Result<u32, FlakyError> = run_with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(FlakyError(false)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            base: 2.0,
        };

        let result: Result<u32, FlakyError> = run_with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(FlakyError(true)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
