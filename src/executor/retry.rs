//! Store call retries with exponential backoff and jitter

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event};
use crate::store::StoreResult;

fn default_max_attempts() -> u32 {
    4
}

fn default_base_delay_ms() -> u64 {
    50
}

fn default_max_delay_ms() -> u64 {
    2_000
}

/// Retry budget for a single store call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts, the first call included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetrySettings {
    /// A single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// Retries without sleeping
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }
}

/// Delay before retry number `attempt` (1-based).
///
/// `base * 2^(attempt-1)` plus up to `base` of jitter, capped at `max_ms`.
pub fn next_retry_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let multiplier = 2_u64.saturating_pow(attempt.saturating_sub(1));
    let delay = base_ms.saturating_mul(multiplier);
    let jitter = if base_ms == 0 {
        0
    } else {
        rand::random::<u64>() % base_ms.saturating_add(1)
    };
    Duration::from_millis(delay.saturating_add(jitter).min(max_ms))
}

/// Run a store operation, retrying retryable errors.
///
/// Returns the final result and the number of retries performed.
pub async fn retry_store<T, F, Fut>(
    operation_name: &str,
    settings: &RetrySettings,
    operation: F,
) -> (StoreResult<T>, usize)
where
    F: Fn() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return (Ok(value), (attempt - 1) as usize),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = next_retry_delay(attempt, settings.base_delay_ms, settings.max_delay_ms);
                log_event_with_fields(
                    Event::PartitionRetry,
                    &[
                        ("operation", operation_name),
                        ("attempt", &attempt.to_string()),
                        ("max_attempts", &max_attempts.to_string()),
                        ("delay_ms", &delay.as_millis().to_string()),
                        ("error", &e.to_string()),
                    ],
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return (Err(e), (attempt - 1) as usize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreError, StoreErrorCode};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_delay_grows_and_caps() {
        assert_eq!(next_retry_delay(1, 0, 1000), Duration::ZERO);

        let first = next_retry_delay(1, 100, 10_000);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(200));

        let third = next_retry_delay(3, 100, 10_000);
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(500));

        assert_eq!(next_retry_delay(30, 100, 1_500), Duration::from_millis(1_500));
    }

    #[test]
    fn test_delay_saturates_at_largest_base() {
        assert_eq!(next_retry_delay(1, u64::MAX, u64::MAX), Duration::from_millis(u64::MAX));
        assert_eq!(next_retry_delay(64, u64::MAX, 2_000), Duration::from_millis(2_000));
    }

    #[tokio::test]
    async fn test_retryable_error_retried_until_success() {
        let calls = AtomicU32::new(0);
        let (result, retries) = retry_store("page", &RetrySettings::immediate(5), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(StoreError::throttled("slow down"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_not_retried() {
        let calls = AtomicU32::new(0);
        let (result, retries) = retry_store::<(), _, _>("page", &RetrySettings::immediate(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::rejected("bad expression")) }
        })
        .await;

        assert_eq!(result.unwrap_err().code(), StoreErrorCode::SearchStoreRejected);
        assert_eq!(retries, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempts_exhausted() {
        let calls = AtomicU32::new(0);
        let (result, retries) = retry_store::<(), _, _>("page", &RetrySettings::immediate(3), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::unavailable("connection reset")) }
        })
        .await;

        assert!(result.unwrap_err().is_retryable());
        assert_eq!(retries, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
