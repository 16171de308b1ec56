use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one request, available to handlers as an extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Reuses a caller-supplied `x-request-id`, otherwise mints a `UUIDv4`.
    fn from_headers(headers: &HeaderMap) -> Self {
        let supplied = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());
        Self(supplied.map_or_else(|| Uuid::new_v4().to_string(), str::to_owned))
    }
}

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    let header = HeaderValue::from_str(&id.0).ok();
    req.extensions_mut().insert(id);

    let mut res = next.run(req).await;
    if let Some(value) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    admitted: usize,
}

/// Fixed-window request budget shared by every route it is layered on.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    limit: usize,
    period: Duration,
    window: Arc<Mutex<Window>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(limit: usize, period: Duration) -> Self {
        Self {
            limit,
            period,
            window: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                admitted: 0,
            })),
        }
    }

    /// `limit` requests per minute. Zero disables limiting.
    #[must_use]
    pub fn per_minute(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Counts one request against the current window, opening a new window
    /// when the period has elapsed. Returns `false` once the budget is spent.
    async fn admit(&self) -> bool {
        if self.limit == 0 {
            return true;
        }
        let mut window = self.window.lock().await;
        if window.opened_at.elapsed() >= self.period {
            *window = Window {
                opened_at: Instant::now(),
                admitted: 0,
            };
        }
        if window.admitted < self.limit {
            window.admitted += 1;
            true
        } else {
            false
        }
    }
}

pub async fn enforce_rate_limit(
    State(limiter): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if limiter.admit().await {
        return next.run(req).await;
    }
    tracing::warn!(path = %req.uri().path(), limit = limiter.limit, "rate limit exceeded");
    ApiError::new("rate_limited", "Rate limit exceeded, try again shortly").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_prefers_supplied_header() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(RequestId::from_headers(&headers).0, "abc-123");
    }

    #[test]
    fn request_id_is_generated_when_absent_or_blank() {
        let generated = RequestId::from_headers(&HeaderMap::new()).0;
        assert!(Uuid::parse_str(&generated).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(""));
        assert!(Uuid::parse_str(&RequestId::from_headers(&headers).0).is_ok());
    }

    #[tokio::test]
    async fn window_admits_up_to_limit_then_refuses() {
        let limiter = RateLimitState::new(2, Duration::from_secs(60));
        assert!(limiter.admit().await);
        assert!(limiter.admit().await);
        assert!(!limiter.admit().await);
    }

    #[tokio::test]
    async fn window_reopens_after_period() {
        let limiter = RateLimitState::new(1, Duration::from_millis(20));
        assert!(limiter.admit().await);
        assert!(!limiter.admit().await);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(limiter.admit().await);
    }

    #[tokio::test]
    async fn zero_limit_never_refuses() {
        let limiter = RateLimitState::per_minute(0);
        for _ in 0..100 {
            assert!(limiter.admit().await);
        }
    }
}
