//! Exponential backoff retry for GitHub API calls.
//!
//! Queries and issue updates are retried on transient errors: 3 retries with
//! 2s, 4s, 8s delays. Comment creation is never retried, since a request that
//! timed out may still have posted the comment and a retry would duplicate the
//! reply.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::error::GitHubApiError;
use crate::effects::GitHubEffect;

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Cap for exponential growth.
    pub max_delay: Duration,

    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// 3 retries with 2s, 4s, 8s delays (~14 seconds total).
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(16),
        backoff_multiplier: 2.0,
    };

    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Computes the delay for the given retry attempt (0-indexed):
    /// `initial_delay * backoff_multiplier^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }

    /// Returns an iterator over all retry delays.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_retries).map(|attempt| self.delay_for_attempt(attempt))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether a call may be retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry transient errors with exponential backoff.
    #[default]
    RetryTransient,

    /// Do not retry - return errors immediately.
    NoRetry,
}

impl RetryPolicy {
    /// The policy for an effect. Only comment creation is non-idempotent.
    pub fn for_effect(effect: &GitHubEffect) -> Self {
        match effect {
            GitHubEffect::CreateComment { .. } => RetryPolicy::NoRetry,
            GitHubEffect::GetIssue { .. }
            | GitHubEffect::ListOpenIssues { .. }
            | GitHubEffect::ListLabels
            | GitHubEffect::UpdateIssue { .. } => RetryPolicy::RetryTransient,
        }
    }
}

/// Executes an async operation, retrying transient errors.
///
/// Permanent errors are returned immediately. Transient errors are returned
/// once the retries are exhausted (or immediately under
/// [`RetryPolicy::NoRetry`]).
pub async fn retry_with_backoff<T, F, Fut>(
    config: RetryConfig,
    policy: RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, GitHubApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GitHubApiError>>,
{
    let max_attempts = match policy {
        RetryPolicy::NoRetry => 1,
        RetryPolicy::RetryTransient => config.max_retries + 1,
    };
    let mut attempt = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        attempt += 1;

        if !err.is_transient() || attempt >= max_attempts {
            return Err(err);
        }

        let delay = config.delay_for_attempt(attempt - 1);
        warn!(
            operation = operation_name,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Transient GitHub error, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IssueNumber;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(10), 2.0)
    }

    #[test]
    fn default_delays_are_2_4_8() {
        let delays: Vec<_> = RetryConfig::DEFAULT.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8)
            ]
        );
    }

    #[test]
    fn only_comment_creation_is_not_retried() {
        let comment = GitHubEffect::CreateComment {
            issue: IssueNumber(1),
            body: "hi".into(),
        };
        assert_eq!(RetryPolicy::for_effect(&comment), RetryPolicy::NoRetry);
        assert_eq!(
            RetryPolicy::for_effect(&GitHubEffect::ListLabels),
            RetryPolicy::RetryTransient
        );
        assert_eq!(
            RetryPolicy::for_effect(&GitHubEffect::GetIssue {
                issue: IssueNumber(1)
            }),
            RetryPolicy::RetryTransient
        );
    }

    #[tokio::test]
    async fn permanent_error_not_retried() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(fast(), RetryPolicy::RetryTransient, "test", move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(GitHubApiError::unexpected_response("not found")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_succeeds_on_third_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(fast(), RetryPolicy::RetryTransient, "test", move || {
            let count = counter_clone.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err(GitHubApiError::transient_without_source("temporary failure"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn transient_exhausts_retries() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(fast(), RetryPolicy::RetryTransient, "test", move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(GitHubApiError::transient_without_source("always fails")) }
        })
        .await;

        assert!(result.unwrap_err().is_transient());
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn no_retry_policy_returns_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(fast(), RetryPolicy::NoRetry, "test", move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(GitHubApiError::transient_without_source("error")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    proptest! {
        #[test]
        fn delays_are_monotonic_and_capped(
            initial_ms in 1u64..1000,
            max_ms in 1000u64..60000,
            multiplier in 1.5f64..3.0,
            max_retries in 1u32..15,
        ) {
            let config = RetryConfig::new(
                max_retries,
                Duration::from_millis(initial_ms),
                Duration::from_millis(max_ms),
                multiplier,
            );

            let delays: Vec<_> = config.delays().collect();
            prop_assert_eq!(delays[0], Duration::from_millis(initial_ms));
            for window in delays.windows(2) {
                prop_assert!(window[1] >= window[0]);
            }
            for delay in &delays {
                prop_assert!(*delay <= Duration::from_millis(max_ms));
            }
        }
    }
}
