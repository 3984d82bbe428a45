use std::future::Future;
use tracing::warn;
use crate::config::RetryConfig;
use crate::error::{Error, Result};
use crate::utils::time::sleep_with_jitter;

/// Attempt budget and backoff schedule for rate-limited requests.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub jitter_ms: u64,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            jitter_ms: config.jitter_ms,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Delay after the `attempt`-th failure (1-based): base, 2x base, 4x base, ...
    pub fn delay_after(&self, attempt: u32) -> u64 {
        let shift = attempt.saturating_sub(1).min(32);
        self.base_delay_ms.saturating_mul(1u64 << shift)
    }
}

/// Runs `operation` until it succeeds, fails with a non rate-limit error, or the
/// attempt budget is spent. Only [`Error::RateLimit`] is retried; a rate limit that
/// outlasts the budget is escalated to [`Error::Fetch`].
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(Error::RateLimit { status }) => {
                if attempt >= policy.max_attempts {
                    return Err(Error::Fetch {
                        status,
                        message: format!("still rate limited after {attempt} attempts"),
                    });
                }

                let delay = policy.delay_after(attempt);
                warn!(
                    attempt = attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay,
                    "Rate limited, backing off"
                );
                sleep_with_jitter(delay, policy.jitter_ms).await;
            }
            Err(e) => return Err(e),
        }
    }
}
