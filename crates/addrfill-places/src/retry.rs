//! Retry with exponential back-off and jitter for the Places client.
//!
//! Only transient failures (timeouts, connect errors, 5xx) are retried. Quota,
//! API-level and deserialization errors are returned immediately; retrying a
//! quota error only burns more of the quota.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PlacesError::ApiError { .. }
        | PlacesError::QuotaExceeded(_)
        | PlacesError::NotFound(_)
        | PlacesError::Deserialize { .. }
        | PlacesError::InvalidBaseUrl { .. } => false,
    }
}

/// Retry budget and delay schedule for one request.
#[derive(Debug)]
struct Backoff {
    base_ms: u64,
    max_retries: u32,
    retries: u32,
}

impl Backoff {
    fn new(max_retries: u32, base_ms: u64) -> Self {
        Self {
            base_ms,
            max_retries,
            retries: 0,
        }
    }

    /// Spends one retry and returns the wait before it, or `None` once the
    /// budget is used up.
    ///
    /// `jitter` is a unit sample in `[0, 1)`, mapped onto a 0.75x to 1.25x
    /// factor of `base_ms × 2^(retry-1)`. The result never exceeds 60 s.
    fn next_delay(&mut self, jitter: f64) -> Option<Duration> {
        if self.retries >= self.max_retries {
            return None;
        }
        self.retries += 1;
        let exponent = (self.retries - 1).min(10);
        let nominal = self
            .base_ms
            .saturating_mul(1u64 << exponent)
            .min(MAX_DELAY_MS);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let jittered = (nominal as f64 * (0.75 + jitter.clamp(0.0, 1.0) * 0.5)) as u64;
        Some(Duration::from_millis(jittered.min(MAX_DELAY_MS)))
    }
}

/// Runs `operation`, retrying transient failures with up to `max_retries`
/// additional attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut backoff = Backoff::new(max_retries, backoff_base_ms);
    loop {
        let err = match operation().await {
            Ok(value) => {
                if backoff.retries > 0 {
                    tracing::debug!(retries = backoff.retries, "Places request recovered");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        let delay = if is_retriable(&err) {
            backoff.next_delay(rand::random::<f64>())
        } else {
            None
        };
        let Some(delay) = delay else {
            if backoff.retries > 0 {
                tracing::warn!(retries = backoff.retries, error = %err, "Places request gave up");
            }
            return Err(err);
        };

        tracing::warn!(
            retry = backoff.retries,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "Places transient error, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
