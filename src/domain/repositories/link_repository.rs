//! Repository trait for link storage.

use crate::domain::entities::Link;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for persisting links.
///
/// Every operation runs a single statement and never holds a pooled
/// connection across round trips.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates the `links` table if it does not exist yet.
    ///
    /// Safe to call on every start.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on connectivity or permission errors.
    async fn ensure_schema(&self) -> Result<(), AppError>;

    /// Inserts a link and returns the persisted record with its assigned
    /// `id` and `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] or [`AppError::Timeout`] on storage failure.
    async fn insert(&self, url: &str) -> Result<Link, AppError>;

    /// Returns all links, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] or [`AppError::Timeout`] on storage failure.
    async fn list(&self) -> Result<Vec<Link>, AppError>;

    /// Round-trips a trivial query to check connectivity.
    async fn ping(&self) -> Result<(), AppError>;
}
