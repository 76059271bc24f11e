//! Retry wrapper for API calls with exponential backoff.
//!
//! Only errors the caller classifies as transient (rate limits, exhausted
//! quota) are retried; everything else propagates immediately so the per-row
//! fallback can take over.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{DEFAULT_INITIAL_BACKOFF_SECS, DEFAULT_MAX_ATTEMPTS, MAX_BACKOFF_SECS};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_secs(DEFAULT_INITIAL_BACKOFF_SECS),
            max_delay: Duration::from_secs(MAX_BACKOFF_SECS),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with specified parameters
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
        }
    }
}

/// Outcome of a retried operation that never succeeded.
#[derive(Debug, Error)]
pub enum RetryError<E: std::error::Error + 'static> {
    /// A non-transient error; surfaced immediately without retrying
    #[error(transparent)]
    Fatal(E),
    /// All attempts failed with transient errors
    #[error("API call failed after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: E,
    },
}

/// Execute an async operation with exponential backoff retry.
///
/// A failure for which `is_transient` returns true is retried after a delay
/// that starts at `config.initial_delay` and doubles on each retry (capped at
/// `config.max_delay`). Any other failure is returned immediately. Running out
/// of attempts yields [`RetryError::Exhausted`] carrying the last error.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    is_transient: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let mut delay = config.initial_delay;
    let max_attempts = config.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !is_transient(&e) => return Err(RetryError::Fatal(e)),
            Err(e) => {
                if attempt == max_attempts {
                    return Err(RetryError::Exhausted {
                        attempts: max_attempts,
                        last: e,
                    });
                }

                tracing::warn!(
                    "Transient API failure (attempt {}/{}): {}. Retrying in {:?}...",
                    attempt,
                    max_attempts,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(config.max_delay);
            }
        }
    }

    unreachable!("retry loop returns on the final attempt")
}
