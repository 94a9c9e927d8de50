//! Hardening response headers.
//!
//! Each header is only set when the handler did not provide its own value.

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self';base-uri 'self';\
font-src 'self' https: data:;form-action 'self';frame-ancestors 'self';\
img-src 'self' data:;object-src 'none';script-src 'self';script-src-attr 'none';\
style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests";

/// Header names and values applied to every response.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    (
        "strict-transport-security",
        "max-age=15552000; includeSubDomains",
    ),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Wraps `router` with one header-setting layer per entry of [`SECURITY_HEADERS`].
///
/// # Example
///
/// ```rust,ignore
/// let app = security_headers::apply(Router::new().route("/", get(index)));
/// ```
pub fn apply(router: Router) -> Router {
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_headers_are_added() {
        let app = apply(Router::new().route("/", get(|| async { "ok" })));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/").await;

        response.assert_status_ok();
        for (name, value) in SECURITY_HEADERS {
            response.assert_header(*name, *value);
        }
    }

    #[tokio::test]
    async fn test_existing_header_is_kept() {
        let app = apply(Router::new().route(
            "/",
            get(|| async {
                (
                    StatusCode::OK,
                    [(header::X_FRAME_OPTIONS, "DENY")],
                    "framed",
                )
                    .into_response()
            }),
        ));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/").await;

        response.assert_header("x-frame-options", "DENY");
    }

    #[tokio::test]
    async fn test_headers_on_not_found() {
        let app = apply(Router::new());
        let server = TestServer::new(app).unwrap();

        let response = server.get("/missing").await;

        response.assert_status_not_found();
        response.assert_header("x-content-type-options", "nosniff");
    }
}
