//! Link creation and listing service.

use serde_json::Value;
use std::sync::Arc;

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::url_validator::{UrlValidationError, validate_link_payload};

/// Service composing payload validation with link storage.
///
/// Handlers never reach the repository directly; the repository is injected
/// so tests can substitute a mock.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<dyn LinkRepository>) -> Self {
        Self { link_repository }
    }

    /// Validates a raw request body and stores the submitted URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UrlRequired`] or [`AppError::InvalidUrl`] when the
    /// payload is rejected; nothing is written in that case.
    ///
    /// Returns [`AppError::Database`] or [`AppError::Timeout`] on storage failure.
    pub async fn create_link(&self, payload: &Value) -> Result<Link, AppError> {
        let url = validate_link_payload(payload).map_err(|e| match e {
            UrlValidationError::Missing => AppError::UrlRequired,
            UrlValidationError::Malformed => AppError::InvalidUrl,
        })?;

        let link = self.link_repository.insert(&url).await?;
        tracing::debug!(id = link.id, "link stored");

        Ok(link)
    }

    /// Returns every stored link, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] or [`AppError::Timeout`] on storage failure.
    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        self.link_repository.list().await
    }

    /// Checks that storage is reachable.
    pub async fn check_storage(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }
}
