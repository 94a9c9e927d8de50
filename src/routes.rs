//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`     - Health check (public, not rate limited)
//! - `/api/*`           - Link API (rate limited per client)
//! - everything else    - Static files, `index.html` for `/`
//!
//! # Middleware
//!
//! Outermost first: tracing, security headers, sanitization, parameter
//! pollution guard, CORS, then rate limiting on `/api` only. Later layers
//! rely on the normalization done by earlier ones, so this order must not
//! change.
//!
//! The body limit is enforced by the sanitization layer on the bytes as
//! received. Extractors downstream see the escaped body, which can be
//! longer, so their own limit is disabled.

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::rate_limit::RateLimitState;
use crate::api::middleware::sanitize::BodyLimit;
use crate::api::middleware::{
    cors, param_pollution, rate_limit, sanitize, security_headers, tracing,
};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Router, middleware};
use std::path::PathBuf;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

/// Settings for the middleware chain.
#[derive(Clone)]
pub struct RouterOptions {
    /// Single allowed CORS origin; `None` admits any origin.
    pub cors_origin: Option<HeaderValue>,
    pub rate_limit: RateLimitState,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
    /// Directory served for non-API paths.
    pub static_dir: PathBuf,
}

/// Constructs the router with all routes and middleware.
pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    let api_router = api::routes::link_routes().layer(middleware::from_fn_with_state(
        options.rate_limit,
        rate_limit::layer,
    ));

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .fallback_service(ServeDir::new(options.static_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(cors::layer(options.cors_origin))
        .layer(middleware::from_fn(param_pollution::layer))
        .layer(middleware::from_fn_with_state(
            BodyLimit(options.body_limit),
            sanitize::layer,
        ));

    security_headers::apply(router).layer(tracing::layer())
}

/// [`build_router`] with trailing slashes trimmed before routing.
pub fn app_router(state: AppState, options: RouterOptions) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, options))
}
