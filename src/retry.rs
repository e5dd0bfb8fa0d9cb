//! Retry operations with exponential backoff
//!
//! Used by the HTTP layer to ride out transient API failures (rate limiting,
//! gateway errors, dropped connections) on idempotent requests. Server-side
//! asynchronous work is not retried here; that is the job of the
//! transaction poller.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Configuration for the exponential backoff retry strategy
///
/// # Examples
///
/// ```
/// use scc_toolkit::retry::RetryConfig;
///
/// let default_config = RetryConfig::default();
/// assert_eq!(default_config.max_retries, 3);
///
/// // Tests usually want a fast, deterministic schedule
/// let fast = RetryConfig {
///     max_retries: 2,
///     initial_backoff_ms: 1,
///     backoff_factor: 1.0,
///     max_backoff_ms: 1,
///     add_jitter: false,
/// };
/// assert!(!fast.add_jitter);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_retries: u32,

    /// Initial wait time in milliseconds
    pub initial_backoff_ms: u64,

    /// Multiplier for each subsequent retry
    pub backoff_factor: f64,

    /// Maximum backoff time in milliseconds
    pub max_backoff_ms: u64,

    /// Whether to add jitter to backoff times
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            backoff_factor: 2.0,
            max_backoff_ms: 10_000,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    /// A configuration that performs exactly one attempt
    pub fn no_retry() -> Self {
        Self {
            max_retries: 1,
            ..Self::default()
        }
    }
}

/// Executes a future with exponential backoff retry logic
///
/// The operation is attempted until it succeeds, `is_retriable` rejects the
/// error, or `config.max_retries` attempts have been made. The last error is
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use scc_toolkit::retry::{RetryConfig, with_exponential_backoff};
///
/// # async fn example() -> anyhow::Result<()> {
/// let value = with_exponential_backoff(
///     || async { Ok::<_, anyhow::Error>("ok") },
///     |err| err.to_string().contains("503"),
///     &RetryConfig::default(),
/// )
/// .await?;
/// assert_eq!(value, "ok");
/// # Ok(())
/// # }
/// ```
pub async fn with_exponential_backoff<F, Fut, T, E, R>(
    operation: F,
    is_retriable: R,
    config: &RetryConfig,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0;
    let mut backoff_ms = config.initial_backoff_ms;

    loop {
        let result = operation().await;

        match &result {
            Ok(_) => return result,
            Err(err) => {
                attempt += 1;

                if attempt >= config.max_retries || !is_retriable(err) {
                    return result;
                }

                let jittered_ms = if config.add_jitter {
                    let jitter_factor = rand::random::<f64>() * 0.2 + 0.9; // 0.9-1.1 range
                    (backoff_ms as f64 * jitter_factor) as u64
                } else {
                    backoff_ms
                };

                let delay = std::cmp::min(jittered_ms, config.max_backoff_ms);

                debug!(
                    "Retry attempt {}/{} after {}ms delay",
                    attempt, config.max_retries, delay
                );

                sleep(Duration::from_millis(delay)).await;

                backoff_ms = (backoff_ms as f64 * config.backoff_factor) as u64;
                if backoff_ms > config.max_backoff_ms {
                    backoff_ms = config.max_backoff_ms;
                }
            }
        }
    }
}
