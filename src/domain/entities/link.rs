//! Link entity representing a stored URL.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A stored URL with its storage-assigned identity.
///
/// Links are created once and never updated or deleted. `id` and
/// `created_at` are assigned by the database on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Link {
    pub id: i64,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(id: i64, url: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            url,
            created_at,
        }
    }
}
