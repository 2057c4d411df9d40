//! Bounded retry for transient backend failures.

use std::future::Future;
use std::time::Duration;

use crate::client::ClientOptions;
use crate::error::ClientError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** connect failures, timeouts, and HTTP 5xx.
///
/// **Not retriable:** 4xx responses, malformed bodies, bad configuration.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::Http(e) => e.is_timeout() || e.is_connect(),
        ClientError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        ClientError::Deserialize { .. }
        | ClientError::InvalidBaseUrl { .. }
        | ClientError::Overlay(_) => false,
    }
}

/// How many times a request is repeated and how long to wait in between.
///
/// Retry `n` (1-based) waits `base_delay × 2ⁿ⁻¹`, capped at `max_delay`,
/// then scaled by a random factor in `[0.75, 1.25]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl From<&ClientOptions> for RetryPolicy {
    fn from(options: &ClientOptions) -> Self {
        Self {
            max_retries: options.max_retries,
            base_delay: Duration::from_millis(options.backoff_base_ms),
            max_delay: Duration::from_millis(options.max_backoff_ms),
        }
    }
}

impl RetryPolicy {
    /// Un-jittered wait before retry number `retry`.
    pub(crate) fn nominal_delay(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn jittered_delay(&self, retry: u32) -> Duration {
        self.nominal_delay(retry)
            .mul_f64(rand::random_range(0.75..=1.25))
    }

    /// Runs `operation` until it succeeds, fails with a non-retriable error,
    /// or the retry budget is spent; the last error is returned.
    pub(crate) async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut retry = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if retry >= self.max_retries || !is_retriable(&err) {
                return Err(err);
            }

            retry += 1;
            let delay = self.jittered_delay(retry);
            tracing::warn!(
                retry,
                max_retries = self.max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "backend request failed; retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
