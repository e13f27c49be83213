//! Rate-limit detection and the bounded retry policy.
//!
//! A limiting response is retried after the delay the server asks for, at
//! most `max_retries` times per request. The next limiting response for the
//! same request is returned to the caller as an error.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// Wait used when a limiting response carries no usable delay header.
const DEFAULT_WAIT: Duration = Duration::from_secs(60);

/// Retry policy for rate-limited requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    max_retries: u32,
    max_wait: Duration,
}

impl ThrottlePolicy {
    pub const fn new(max_retries: u32, max_wait: Duration) -> Self {
        Self {
            max_retries,
            max_wait,
        }
    }

    /// Whether a request that has already been retried `retries` times may
    /// be retried again.
    pub const fn should_retry(&self, retries: u32) -> bool {
        retries < self.max_retries
    }

    /// Clamp a server-requested wait to the configured maximum.
    pub fn bounded(&self, wait: Duration) -> Duration {
        wait.min(self.max_wait)
    }
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_secs(300))
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// If the response signals a primary or secondary rate limit, the delay to
/// wait before retrying. `now_epoch_secs` is used with `x-ratelimit-reset`.
pub fn rate_limit_wait(
    status: StatusCode,
    headers: &HeaderMap,
    now_epoch_secs: u64,
) -> Option<Duration> {
    let retry_after = header_u64(headers, "retry-after");
    let exhausted = header_u64(headers, "x-ratelimit-remaining") == Some(0);

    let limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && (exhausted || retry_after.is_some()));
    if !limited {
        return None;
    }

    if let Some(secs) = retry_after {
        return Some(Duration::from_secs(secs));
    }
    if let Some(reset) = header_u64(headers, "x-ratelimit-reset") {
        return Some(Duration::from_secs(reset.saturating_sub(now_epoch_secs)));
    }
    Some(DEFAULT_WAIT)
}
