//! HTTP request handlers for API endpoints.

pub mod health;
pub mod links;

pub use health::health_handler;
pub use links::{api_not_found_handler, create_link_handler, list_links_handler};
