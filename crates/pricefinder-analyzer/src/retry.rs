//! Retry with exponential back-off and jitter for generation calls.
//!
//! [`retry_with_backoff`] retries transient failures (network errors, 429,
//! 5xx). Credential rejections and reply-shape errors are returned at once.

use std::future::Future;
use std::time::Duration;

use crate::error::AnalyzerError;

pub(crate) fn is_retriable(err: &AnalyzerError) -> bool {
    match err {
        AnalyzerError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        AnalyzerError::RateLimited { .. } => true,
        AnalyzerError::UnexpectedStatus { status, .. } => *status >= 500,
        AnalyzerError::InvalidCredential { .. }
        | AnalyzerError::ModelNotFound { .. }
        | AnalyzerError::EmptyResponse
        | AnalyzerError::MalformedResponse(_)
        | AnalyzerError::NoProducts
        | AnalyzerError::NoListings
        | AnalyzerError::InvalidUrl { .. }
        | AnalyzerError::Deserialize { .. } => false,
    }
}

const MAX_DELAY_MS: u64 = 60_000;

/// Lower bound on the next wait, taken from a `Retry-After` hint.
fn retry_after_ms(err: &AnalyzerError) -> u64 {
    match err {
        AnalyzerError::RateLimited {
            retry_after_secs: Some(secs),
        } => secs.saturating_mul(1_000).min(MAX_DELAY_MS),
        _ => 0,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The wait before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 % jitter,
/// capped at 60 s. A `Retry-After` hint on a 429 raises the wait to at least
/// that long.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, AnalyzerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AnalyzerError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let delay_ms = jittered.max(retry_after_ms(&err));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "generation call failed, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
