//! HTTP middleware for request processing and protection.
//!
//! Layers run in this order on every request:
//!
//! 1. [`tracing`] - request/response logging
//! 2. [`security_headers`] - hardening response headers
//! 3. [`sanitize`] - markup escaping in query and JSON body
//! 4. [`param_pollution`] - duplicate query key collapsing
//! 5. [`cors`] - cross-origin policy
//! 6. [`rate_limit`] - per-client request cap (API routes only)

pub mod cors;
pub mod param_pollution;
pub mod rate_limit;
pub mod sanitize;
pub mod security_headers;
pub mod tracing;

use axum::extract::Request;
use axum::http::uri::{PathAndQuery, Uri};

/// Replaces the query string of `req`, keeping scheme, authority and path.
///
/// An empty `query` removes the query string entirely.
pub(crate) fn replace_query(req: &mut Request, query: &str) -> Result<(), axum::http::Error> {
    let path = req.uri().path();
    let path_and_query = if query.is_empty() {
        PathAndQuery::try_from(path)?
    } else {
        PathAndQuery::try_from(format!("{path}?{query}"))?
    };

    let mut parts = req.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    *req.uri_mut() = Uri::from_parts(parts)?;

    Ok(())
}
