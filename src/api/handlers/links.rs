//! Handlers for link endpoints (create, list).

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;

use crate::domain::entities::Link;
use crate::error::AppError;
use crate::state::AppState;

/// Stores a submitted URL.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "id": 1, "url": "https://example.com", "created_at": "2024-05-01T12:30:00.123456Z" }
/// ```
///
/// # Errors
///
/// - `400` - `URL is required`, `Invalid URL format` or `Invalid JSON body`
/// - `413` - body exceeds the configured limit
/// - `500` - `Server error` (details are logged, never returned)
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Link>), AppError> {
    let payload = json_body(payload)?;

    let link = state.link_service.create_link(&payload).await?;

    Ok((StatusCode::CREATED, Json(link)))
}

/// Lists all stored links, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
///
/// # Errors
///
/// - `500` - `Server error` (details are logged, never returned)
pub async fn list_links_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Link>>, AppError> {
    let links = state.link_service.list_links().await?;
    Ok(Json(links))
}

/// Answers paths under `/api` that match no route.
///
/// Registered as the API router's fallback so these requests still pass
/// through the API rate limit.
pub async fn api_not_found_handler() -> AppError {
    AppError::NotFound
}

/// Resolves the body extractor result into an untyped JSON value.
///
/// A request without a JSON content type carries no usable body and is
/// treated like an empty one, so it fails validation as a missing URL.
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Null),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLarge)
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected request body");
            Err(AppError::InvalidBody)
        }
    }
}
