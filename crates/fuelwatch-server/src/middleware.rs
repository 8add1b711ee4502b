use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 128;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[derive(Debug)]
struct FanOutWindow {
    opened_at: Instant,
    admitted: usize,
}

/// Fixed-window limiter shared by every route that triggers a collection
/// cycle. Each admitted request fans out to the whole provider table.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    current: Arc<Mutex<FanOutWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            current: Arc::new(Mutex::new(FanOutWindow {
                opened_at: Instant::now(),
                admitted: 0,
            })),
        }
    }

    /// Admit one request, or return how long until the window reopens.
    async fn admit(&self) -> Result<(), Duration> {
        let mut current = self.current.lock().await;
        let elapsed = current.opened_at.elapsed();

        if elapsed >= self.window {
            current.opened_at = Instant::now();
            current.admitted = 0;
        } else if current.admitted >= self.max_requests {
            return Err(self.window - elapsed);
        }

        current.admitted += 1;
        Ok(())
    }
}

/// A caller-supplied ID is kept only if it is short printable ASCII.
fn accept_request_id(value: &HeaderValue) -> Option<String> {
    let id = value.to_str().ok()?.trim();
    let acceptable = !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id.bytes().all(|b| b.is_ascii_graphic());
    acceptable.then(|| id.to_string())
}

/// Reuse the caller's `x-request-id` when acceptable, otherwise generate a
/// `UUIDv4`. The ID is stored as a [`RequestId`] extension and echoed on the
/// response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(accept_request_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, val);
    }
    res
}

/// Rejects requests over the window budget with `429` and `Retry-After`.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    match rate_limit.admit().await {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            let request_id = req
                .extensions()
                .get::<RequestId>()
                .map(|id| id.0.clone())
                .unwrap_or_default();
            tracing::warn!(request_id = %request_id, "collection rate limit exceeded");

            let mut res =
                ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response();
            let secs = retry_after.as_secs().max(1);
            if let Ok(val) = HeaderValue::from_str(&secs.to_string()) {
                res.headers_mut().insert(header::RETRY_AFTER, val);
            }
            res
        }
    }
}
