//! Markup escaping for inbound query strings and JSON bodies.
//!
//! Every `<` in query keys and values and in JSON object keys and string
//! values is replaced with `&lt;`, so stored input cannot open an HTML tag
//! when it is later rendered.

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::api::middleware::replace_query;
use crate::error::AppError;

/// Maximum accepted request body size in bytes.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimit(pub usize);

/// Escapes markup in a single string.
pub fn escape_markup(input: &str) -> String {
    input.replace('<', "&lt;")
}

/// Recursively escapes markup in object keys and string values.
pub fn sanitize_json(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(escape_markup(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_json).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (escape_markup(&k), sanitize_json(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

/// Escapes markup in a raw query string.
///
/// Returns `None` when nothing needed escaping, so untouched queries keep
/// their original encoding.
pub fn sanitize_query(query: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if !pairs.iter().any(|(k, v)| k.contains('<') || v.contains('<')) {
        return None;
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (k, v) in &pairs {
        serializer.append_pair(&escape_markup(k), &escape_markup(v));
    }
    Some(serializer.finish())
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// True when buffering stopped because the body exceeded the limit.
fn exceeds_limit(err: &axum::Error) -> bool {
    std::error::Error::source(err).is_some_and(|source| source.is::<LengthLimitError>())
}

/// Sanitizes the query string and, for JSON requests, the body.
///
/// The limit applies to the body as received: larger bodies are rejected
/// with `413 Payload Too Large` before any escaping, and the escaped body
/// may then exceed it. Bodies that fail to arrive get `400`. A JSON body
/// that does not parse is forwarded unchanged so the handler can report it.
pub async fn layer(State(limit): State<BodyLimit>, mut req: Request, next: Next) -> Response {
    if let Some(sanitized) = req.uri().query().and_then(sanitize_query)
        && let Err(e) = replace_query(&mut req, &sanitized)
    {
        tracing::warn!(error = %e, "failed to rewrite sanitized query");
    }

    if !is_json(&req) {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let bytes = match to_bytes(body, limit.0).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            tracing::debug!(limit = limit.0, "request body over limit");
            return AppError::PayloadTooLarge.into_response();
        }
        Err(e) => {
            tracing::debug!(error = %e, "failed to read request body");
            return AppError::UnreadableBody.into_response();
        }
    };

    let bytes = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => match serde_json::to_vec(&sanitize_json(value)) {
            Ok(encoded) => encoded.into(),
            Err(_) => bytes,
        },
        Err(_) => bytes,
    };

    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::RawQuery,
        http::StatusCode,
        middleware,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use serde_json::json;

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape_markup("<script>alert(1)</script>"),
            "&lt;script>alert(1)&lt;/script>"
        );
        assert_eq!(escape_markup("https://example.com"), "https://example.com");
    }

    #[test]
    fn test_sanitize_json_nested() {
        let input = json!({
            "url": "https://example.com/<b>",
            "<key>": [1, "<i>", { "deep": "<x>" }],
            "flag": true
        });

        let output = sanitize_json(input);

        assert_eq!(output["url"], "https://example.com/&lt;b>");
        assert_eq!(output["&lt;key>"][0], 1);
        assert_eq!(output["&lt;key>"][1], "&lt;i>");
        assert_eq!(output["&lt;key>"][2]["deep"], "&lt;x>");
        assert_eq!(output["flag"], true);
    }

    #[test]
    fn test_sanitize_query_untouched() {
        assert_eq!(sanitize_query("a=1&b=hello%20world"), None);
    }

    #[test]
    fn test_sanitize_query_escapes_values() {
        let sanitized = sanitize_query("q=%3Cscript%3E").unwrap();
        let pairs: Vec<(String, String)> = form_urlencoded::parse(sanitized.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(pairs, vec![("q".to_string(), "&lt;script>".to_string())]);
    }

    fn make_server(limit: usize) -> TestServer {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .route(
                "/query",
                get(|RawQuery(query): RawQuery| async move { query.unwrap_or_default() }),
            )
            .layer(middleware::from_fn_with_state(BodyLimit(limit), layer));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_json_body_is_sanitized() {
        let server = make_server(1024);

        let response = server
            .post("/echo")
            .json(&json!({ "url": "https://example.com/<script>" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "url": "https://example.com/&lt;script>" }));
    }

    #[tokio::test]
    async fn test_query_is_sanitized() {
        let server = make_server(1024);

        let response = server.get("/query?name=%3Cb%3E").await;

        response.assert_status_ok();
        let query = response.text();
        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(pairs, vec![("name".to_string(), "&lt;b>".to_string())]);
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let server = make_server(16);

        let response = server
            .post("/echo")
            .json(&json!({ "url": "https://example.com/a-rather-long-path" }))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_invalid_json_passes_through() {
        let server = make_server(1024);

        let response = server
            .post("/echo")
            .text("{not json")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_only_length_errors_count_as_too_large() {
        let over = to_bytes(Body::from(vec![b'a'; 32]), 8).await.unwrap_err();
        assert!(exceeds_limit(&over));

        let broken = axum::Error::new(std::io::Error::other("connection reset"));
        assert!(!exceeds_limit(&broken));
    }
}
