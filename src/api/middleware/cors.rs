//! Cross-origin resource sharing policy.

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

/// Creates the CORS layer.
///
/// # Policy
///
/// - **Origin**: only `allowed_origin` when set (production); otherwise the
///   request origin is mirrored back, which admits any origin while staying
///   compatible with credentials
/// - **Methods**: `GET`, `POST`
/// - **Headers**: mirrored from the preflight request
/// - **Credentials**: allowed
pub fn layer(allowed_origin: Option<HeaderValue>) -> CorsLayer {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::list([origin]),
        None => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use axum::{Router, routing::get};
    use axum_test::TestServer;

    fn make_server(allowed_origin: Option<HeaderValue>) -> TestServer {
        let app = Router::new()
            .route("/api/links", get(|| async { "[]" }))
            .layer(layer(allowed_origin));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_any_origin_is_mirrored_outside_production() {
        let server = make_server(None);

        let response = server
            .get("/api/links")
            .add_header(header::ORIGIN, "https://anywhere.test")
            .await;

        response.assert_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "https://anywhere.test");
        response.assert_header(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true");
    }

    #[tokio::test]
    async fn test_only_configured_origin_in_production() {
        let server = make_server(Some(HeaderValue::from_static("https://app.example.com")));

        let allowed = server
            .get("/api/links")
            .add_header(header::ORIGIN, "https://app.example.com")
            .await;
        allowed.assert_header(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            "https://app.example.com",
        );

        let denied = server
            .get("/api/links")
            .add_header(header::ORIGIN, "https://evil.test")
            .await;
        assert!(
            denied
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_preflight_lists_get_and_post() {
        let server = make_server(None);

        let response = server
            .method(Method::OPTIONS, "/api/links")
            .add_header(header::ORIGIN, "https://anywhere.test")
            .add_header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .await;

        response.assert_status_ok();
        let methods = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(methods.contains("GET"));
        assert!(methods.contains("POST"));
        assert!(!methods.contains("DELETE"));
    }
}
