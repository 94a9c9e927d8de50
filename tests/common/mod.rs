#![allow(dead_code)]

use axum::Router;
use link_store::api::middleware::rate_limit::RateLimitState;
use link_store::application::services::LinkService;
use link_store::domain::rate_limiter::FixedWindowLimiter;
use link_store::domain::repositories::LinkRepository;
use link_store::infrastructure::persistence::PgLinkRepository;
use link_store::routes::{RouterOptions, build_router};
use link_store::state::AppState;
use sqlx::PgPool;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Repository over a fresh test database with the `links` table in place.
pub async fn create_repository(pool: PgPool) -> PgLinkRepository {
    let repo = PgLinkRepository::new(Arc::new(pool));
    repo.ensure_schema().await.unwrap();
    repo
}

pub async fn create_test_state(pool: PgPool) -> AppState {
    let repo = create_repository(pool).await;
    AppState::new(Arc::new(LinkService::new(Arc::new(repo))))
}

pub fn test_options(rate_limit_max: u32) -> RouterOptions {
    let limiter = Arc::new(FixedWindowLimiter::new(
        Duration::from_secs(15 * 60),
        rate_limit_max,
    ));

    RouterOptions {
        cors_origin: None,
        rate_limit: RateLimitState::new(limiter, false),
        body_limit: 100 * 1024,
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public"),
    }
}

/// Full application router with the production middleware chain.
pub async fn create_test_router(pool: PgPool, rate_limit_max: u32) -> Router {
    let state = create_test_state(pool).await;
    build_router(state, test_options(rate_limit_max))
}

pub async fn count_links(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await
        .unwrap()
}
