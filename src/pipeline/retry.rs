//! Generic retry policy with exponential backoff and jitter.
//!
//! Reusable for any operation that yields `GenerateError`: classification
//! decides retryability, delays grow exponentially up to a ceiling, and a
//! bounded random jitter is added so synchronized clients don't retry in
//! lockstep.

use super::error::GenerateError;
use crate::config::RetryConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Resolved retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            backoff_multiplier: config.backoff_multiplier,
            jitter_max_ms: config.jitter_max_ms,
        }
    }
}

impl RetryPolicy {
    /// Deterministic backoff component for a 1-based attempt number:
    /// `min(base * multiplier^(attempt-1), max)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let scaled = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let capped = scaled.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// Backoff plus a random jitter in `0..=jitter_max_ms`.
    pub fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter_max_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_max_ms)
        };
        self.backoff_delay(attempt) + Duration::from_millis(jitter)
    }
}

/// Drive `operation` under `policy`.
///
/// The closure receives the 1-based attempt number. Non-retryable errors
/// abort immediately with the original error; a retryable error on the
/// final attempt is wrapped in `RetryExhausted` with the attempt count.
pub async fn retry_with_policy<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, GenerateError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, GenerateError>>,
{
    let mut last_error: Option<GenerateError> = None;

    for attempt in 1..=policy.max_attempts {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() => {
                metrics::counter!("scribelink_retries_total", "kind" => error.kind()).increment(1);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %error,
                    "Retryable failure"
                );

                if attempt < policy.max_attempts {
                    let delay = policy.delay_with_jitter(attempt);
                    tracing::debug!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(error);
            }
            Err(error) => {
                tracing::warn!(attempt, error = %error, "Non-retryable failure, aborting");
                return Err(error);
            }
        }
    }

    Err(GenerateError::RetryExhausted {
        attempts: policy.max_attempts,
        source: Box::new(last_error.unwrap_or(GenerateError::NoEndpointFound)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 10,
            max_delay_ms: 40,
            backoff_multiplier: 2.0,
            jitter_max_ms: 0,
        }
    }

    #[test]
    fn test_backoff_delays_are_non_decreasing_and_capped() {
        let policy = RetryPolicy {
            max_attempts: 6,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
            backoff_multiplier: 2.0,
            jitter_max_ms: 0,
        };
        let delays: Vec<u64> = (1..=6)
            .map(|a| policy.backoff_delay(a).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 8000, 8000]);
        for pair in delays.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[tokio::test]
    async fn test_retryable_failure_uses_all_attempts() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_policy(&policy(), |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(GenerateError::Network("refused".into())) }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        match result {
            Err(GenerateError::RetryExhausted { attempts: 3, source }) => {
                assert!(matches!(*source, GenerateError::Network(_)));
            }
            other => panic!("expected RetryExhausted, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_aborts_after_one_attempt() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_policy(&policy(), |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(GenerateError::Http {
                    status: 400,
                    message: "bad request".into(),
                })
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(GenerateError::Http { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_success_after_transient_failure() {
        let attempts = AtomicU32::new(0);
        let result = retry_with_policy(&policy(), |attempt| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(GenerateError::Timeout(100))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_immediate_success_does_not_retry() {
        let attempts = AtomicU32::new(0);
        let result = retry_with_policy(&policy(), |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Ok("note") }
        })
        .await;

        assert_eq!(result.unwrap(), "note");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    proptest! {
        #[test]
        fn prop_delay_never_exceeds_cap_plus_jitter(
            attempt in 1u32..12,
            base in 1u64..5000,
            max in 1u64..20000,
            jitter in 0u64..1000,
        ) {
            let policy = RetryPolicy {
                max_attempts: 3,
                base_delay_ms: base,
                max_delay_ms: max,
                backoff_multiplier: 2.0,
                jitter_max_ms: jitter,
            };
            let delay = policy.delay_with_jitter(attempt).as_millis() as u64;
            prop_assert!(delay <= max + jitter);
        }

        #[test]
        fn prop_backoff_monotonic_in_attempt(attempt in 1u32..11) {
            let policy = RetryPolicy {
                max_attempts: 3,
                base_delay_ms: 100,
                max_delay_ms: 10_000,
                backoff_multiplier: 1.5,
                jitter_max_ms: 0,
            };
            let current = policy.backoff_delay(attempt);
            let next = policy.backoff_delay(attempt + 1);
            prop_assert!(current <= next);
        }
    }
}
