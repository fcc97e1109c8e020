//! Retry logic with exponential backoff for directory HTTP calls.
//!
//! Retries only on transient failures (connection errors, timeouts, 5xx
//! responses). Terminal statuses (404, 403) and successful responses are
//! returned immediately without retry.

use std::time::Duration;

/// Maximum number of attempts, including the first.
pub(crate) const MAX_ATTEMPTS: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms).
const BASE_DELAY_MS: u64 = 200;

/// Per-attempt outcome as classified by the caller's closure.
pub(crate) enum Attempt<T> {
    /// Terminal outcome — return it without further attempts.
    Done(T),
    /// Transient failure — retry if attempts remain.
    Transient(String),
}

/// Run `f` up to [`MAX_ATTEMPTS`] times with exponential backoff between
/// transient failures.
///
/// Returns `Err(last_failure)` with the attempt count when all attempts
/// were transient.
pub(crate) async fn with_backoff<T, F, Fut>(f: F) -> Result<T, (u32, String)>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Attempt<T>>,
{
    let mut last_failure = String::new();
    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt - 1));
            tracing::warn!(
                attempt = attempt + 1,
                max_attempts = MAX_ATTEMPTS,
                "directory request failed, retrying in {delay:?}: {last_failure}"
            );
            tokio::time::sleep(delay).await;
        }
        match f().await {
            Attempt::Done(value) => return Ok(value),
            Attempt::Transient(reason) => last_failure = reason,
        }
    }
    Err((MAX_ATTEMPTS, last_failure))
}
