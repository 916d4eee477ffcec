//! Exponential backoff with jitter around provider calls.

use std::future::Future;
use std::time::Duration;

use lernkarten_core::config::RetryConfig;
use rand::Rng;
use tracing::warn;

use crate::provider::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: u32,
    /// Uniform random extra delay in `[0, max_jitter]` added to every pause.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(c: &RetryConfig) -> Self {
        Self {
            max_attempts: c.max_attempts,
            initial_delay: Duration::from_millis(c.initial_delay_ms),
            backoff_factor: c.backoff_factor,
            max_jitter: Duration::from_millis(c.max_jitter_ms),
        }
    }
}

impl RetryPolicy {
    /// No pauses between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            backoff_factor: 1,
            max_jitter: Duration::ZERO,
        }
    }

    /// Pause before retry number `retry` (1-based), without jitter.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = self
            .backoff_factor
            .saturating_pow(retry.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }

    fn jitter(&self) -> Duration {
        let max = self.max_jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max))
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// attempts are used up.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => err,
        };

        if attempt >= max_attempts {
            warn!(attempts = attempt, error = %err, "LLM request failed, giving up");
            return Err(LlmError::RetriesExhausted {
                attempts: attempt,
                last: Box::new(err),
            });
        }

        let delay = policy.base_delay(attempt) + policy.jitter();
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "LLM request failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn server_error() -> LlmError {
        LlmError::ApiError {
            status: 503,
            body: "overloaded".into(),
        }
    }

    #[test]
    fn default_policy_matches_config_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(1));
        assert_eq!(policy.backoff_factor, 2);
        assert_eq!(policy.max_jitter, Duration::from_secs(1));
    }

    #[test]
    fn delays_grow_exponentially() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_delay(1), Duration::from_secs(1));
        assert_eq!(policy.base_delay(2), Duration::from_secs(2));
        assert_eq!(policy.base_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn jitter_stays_in_range() {
        let policy = RetryPolicy::default();
        for _ in 0..100 {
            assert!(policy.jitter() <= Duration::from_secs(1));
        }
        assert_eq!(RetryPolicy::immediate(3).jitter(), Duration::ZERO);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&RetryPolicy::immediate(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(server_error())
                } else {
                    Ok("antwort")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "antwort");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&RetryPolicy::immediate(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(server_error()) }
        })
        .await;

        match result {
            Err(LlmError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, LlmError::ApiError { status: 503, .. }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_fail_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&RetryPolicy::immediate(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(LlmError::ApiError {
                    status: 401,
                    body: "bad key".into(),
                })
            }
        })
        .await;

        assert!(matches!(result, Err(LlmError::ApiError { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&RetryPolicy::immediate(0), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, LlmError>(1) }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
