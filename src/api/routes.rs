//! API route configuration.

use crate::api::handlers::{api_not_found_handler, create_link_handler, list_links_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Link API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `GET  /links` - List stored links, newest first
/// - `POST /links` - Store a new link
///
/// Unmatched paths answer `404 {"error": "Not found"}` from inside this
/// router, so layers added to it cover them too.
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .fallback(api_not_found_handler)
}
