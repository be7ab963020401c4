//! Retry with exponential back-off and jitter for the discovery clients.
//!
//! Only transport-level trouble is retried: timeouts, refused connections,
//! 429 and 5xx. Bad bodies and per-item data problems fail fast, since a
//! second request would return the same thing.

use std::future::Future;
use std::time::Duration;

use crate::error::DiscoveryError;

const MAX_DELAY_MS: u64 = 10_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** other 4xx statuses, malformed bodies, bad base URLs,
/// and item-level data problems (missing id or geometry).
pub(crate) fn is_retriable(err: &DiscoveryError) -> bool {
    match err {
        DiscoveryError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        DiscoveryError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        DiscoveryError::Deserialize { .. }
        | DiscoveryError::InvalidBaseUrl { .. }
        | DiscoveryError::MissingId
        | DiscoveryError::MissingGeometry { .. }
        | DiscoveryError::GeometryParse { .. } => false,
    }
}

/// Sleep before the `retry`-th retry (1-based).
///
/// `backoff_base_ms` doubles per retry and is capped at [`MAX_DELAY_MS`]; `jitter`
/// in `[0, 1)` then scales it into the `0.75..1.25` band.
fn backoff_delay(retry: u32, backoff_base_ms: u64, jitter: f64) -> Duration {
    let doubled = backoff_base_ms.saturating_mul(1u64 << retry.saturating_sub(1).min(10));
    Duration::from_millis(doubled.min(MAX_DELAY_MS)).mul_f64(0.75 + jitter * 0.5)
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
///
/// With a 250 ms base the retries wait roughly 250 ms, 500 ms, 1 s, ... (each
/// ±25 %), never more than 10 s. The first non-retriable error, or the last
/// transient one once retries run out, is returned as-is.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, DiscoveryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DiscoveryError>>,
{
    let mut retries_used = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retries_used == max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retries_used += 1;

        let delay = backoff_delay(retries_used, backoff_base_ms, rand::random::<f64>());
        tracing::warn!(
            retry = retries_used,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "discovery request failed transiently, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn status(code: u16) -> DiscoveryError {
        DiscoveryError::UnexpectedStatus {
            status: code,
            url: "http://test/".to_owned(),
        }
    }

    #[test]
    fn server_errors_and_rate_limits_are_retriable() {
        assert!(is_retriable(&status(500)));
        assert!(is_retriable(&status(503)));
        assert!(is_retriable(&status(429)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&status(404)));
        assert!(!is_retriable(&status(400)));
    }

    #[test]
    fn data_errors_are_not_retriable() {
        assert!(!is_retriable(&DiscoveryError::MissingId));
        assert!(!is_retriable(&DiscoveryError::GeometryParse {
            raw: "x".to_owned(),
            reason: "bad".to_owned()
        }));
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        assert!(!is_retriable(&DiscoveryError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, DiscoveryError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(status(503))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status(500))
            }
        })
        .await;
        assert!(matches!(
            result,
            Err(DiscoveryError::UnexpectedStatus { status: 500, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "1 try + 2 retries");
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(status(404))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1, "404 must not be retried");
    }

    #[test]
    fn backoff_doubles_and_stays_within_jitter_band() {
        assert_eq!(backoff_delay(1, 1_000, 0.0), Duration::from_millis(750));
        assert_eq!(backoff_delay(1, 1_000, 0.5), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(2, 1_000, 0.5), Duration::from_millis(2_000));
        assert_eq!(backoff_delay(3, 1_000, 1.0), Duration::from_millis(5_000));
    }

    #[test]
    fn backoff_is_capped_at_ten_seconds() {
        assert_eq!(backoff_delay(8, 1_000, 0.5), Duration::from_millis(MAX_DELAY_MS));
        assert_eq!(backoff_delay(40, u64::MAX, 0.0), Duration::from_millis(7_500));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_requests_back_off_then_succeed() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let started = tokio::time::Instant::now();

        let result = retry_with_backoff(2, 1_000, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(status(429))
                } else {
                    Ok("listed")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "listed");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1 s then 2 s, each within ±25 %.
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(2_250), "waited {waited:?}");
        assert!(waited <= Duration::from_millis(3_750), "waited {waited:?}");
    }
}
