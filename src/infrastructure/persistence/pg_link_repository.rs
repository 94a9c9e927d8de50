//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

const CREATE_LINKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS links (
        id BIGSERIAL PRIMARY KEY,
        url TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

/// PostgreSQL repository for link storage and retrieval.
///
/// Statements run directly on the pool, so each one checks out a connection
/// and returns it when the statement completes or fails. Every statement is
/// bounded by `query_timeout`.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Overrides the per-statement timeout.
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T, AppError>
    where
        T: Send,
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| AppError::Timeout(self.query_timeout))?
            .map_err(AppError::from)
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn ensure_schema(&self) -> Result<(), AppError> {
        self.bounded(sqlx::query(CREATE_LINKS_TABLE).execute(self.pool.as_ref()))
            .await?;
        Ok(())
    }

    async fn insert(&self, url: &str) -> Result<Link, AppError> {
        self.bounded(
            sqlx::query_as::<_, Link>(
                r#"
                INSERT INTO links (url)
                VALUES ($1)
                RETURNING id, url, created_at
                "#,
            )
            .bind(url)
            .fetch_one(self.pool.as_ref()),
        )
        .await
    }

    async fn list(&self) -> Result<Vec<Link>, AppError> {
        self.bounded(
            sqlx::query_as::<_, Link>(
                r#"
                SELECT id, url, created_at
                FROM links
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .fetch_all(self.pool.as_ref()),
        )
        .await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.bounded(sqlx::query("SELECT 1").execute(self.pool.as_ref()))
            .await?;
        Ok(())
    }
}
