//! Rate limiting middleware backed by [`FixedWindowLimiter`].

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::domain::rate_limiter::{FixedWindowLimiter, RateLimitOutcome};
use crate::error::AppError;

const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// State shared by every invocation of [`layer`].
#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: Arc<FixedWindowLimiter>,
    /// When true, the client address is read from `X-Forwarded-For` /
    /// `X-Real-IP` before falling back to the socket peer address.
    pub behind_proxy: bool,
}

impl RateLimitState {
    pub fn new(limiter: Arc<FixedWindowLimiter>, behind_proxy: bool) -> Self {
        Self {
            limiter,
            behind_proxy,
        }
    }
}

/// Caps requests per client address within the limiter's window.
///
/// Admitted responses carry `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
/// `X-RateLimit-Reset` (seconds). Requests over the cap receive
/// `429 Too Many Requests` with a `Retry-After` header.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/links", get(list_links_handler))
///     .layer(middleware::from_fn_with_state(rate_limit_state, rate_limit::layer));
/// ```
pub async fn layer(State(state): State<RateLimitState>, req: Request, next: Next) -> Response {
    let client = client_key(&req, state.behind_proxy);
    let outcome = state.limiter.check(&client);

    let mut response = if outcome.allowed {
        next.run(req).await
    } else {
        tracing::debug!(client = %client, "rate limit exceeded");
        AppError::RateLimited {
            retry_after: outcome.reset_after,
        }
        .into_response()
    };

    insert_headers(response.headers_mut(), &outcome);
    response
}

/// Identifies the client for rate limiting.
fn client_key(req: &Request, behind_proxy: bool) -> String {
    if behind_proxy && let Some(ip) = forwarded_ip(req.headers()) {
        return ip;
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reads the originating client IP set by a reverse proxy.
fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let from_forwarded_for = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let from_real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    from_forwarded_for.or_else(from_real_ip).map(str::to_string)
}

fn insert_headers(headers: &mut HeaderMap, outcome: &RateLimitOutcome) {
    let reset_secs = outcome.reset_after.as_secs_f64().ceil() as u64;

    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(outcome.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(outcome.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_secs));
}
