//! Data Transfer Objects for API responses.
//!
//! Link records are serialized directly from
//! [`crate::domain::entities::Link`]; error bodies use
//! [`crate::error::ErrorResponse`].

pub mod health;
