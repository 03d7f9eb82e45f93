//! HTTP retry helper for transient errors.
//!
//! Only idempotent requests go through [`send`]. Submissions are never
//! retried since a retry after a lost reply would store the report twice.

use std::time::Duration;

use crate::ClientError;

/// Maximum number of retries after the first attempt.
const MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubled on each further retry
/// (250ms, 500ms, 1s).
const BASE_DELAY: Duration = Duration::from_millis(250);

/// Sends the request built by `build_request`, retrying transient
/// failures with exponential backoff.
///
/// The closure is called on each attempt since builders are consumed by
/// `.send()`. Connection errors, timeouts, HTTP 429 and HTTP 5xx are
/// retried; any other response is returned as-is for the caller to
/// decode, as is the last response once retries run out.
///
/// # Errors
///
/// Returns [`ClientError::Http`] if the request cannot be sent after all
/// retries or fails with a non-transient transport error.
#[allow(clippy::future_not_send)]
pub async fn send<F>(build_request: F) -> Result<reqwest::Response, ClientError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::warn!("  retry {attempt}/{MAX_RETRIES} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        let can_retry = attempt < MAX_RETRIES;
        attempt += 1;

        match build_request().send().await {
            Err(e) if can_retry && is_transient(&e) => {
                log::warn!("  transient error: {e}");
            }
            Err(e) => return Err(ClientError::Http(e)),
            Ok(response) if can_retry && is_retryable_status(response.status()) => {
                log::warn!("  HTTP {}", response.status());
            }
            Ok(response) => return Ok(response),
        }
    }
}

const fn backoff(attempt: u32) -> Duration {
    BASE_DELAY.saturating_mul(1 << (attempt - 1))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect()
}

/// 429 and 5xx are retried; other 4xx are permanent.
fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
