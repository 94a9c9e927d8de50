//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, schema initialization, the rate-limiter
//! maintenance task, and the Axum server lifecycle.

use crate::api::middleware::rate_limit::RateLimitState;
use crate::application::services::LinkService;
use crate::config::Config;
use crate::domain::rate_limiter::FixedWindowLimiter;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::persistence::PgLinkRepository;
use crate::routes::{RouterOptions, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - `links` table (idempotent)
/// - Rate limiter and its pruning task
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Schema initialization fails (the server never starts listening)
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    let link_repository = prepare_storage(pool, config.query_timeout()).await?;

    let limiter = Arc::new(FixedWindowLimiter::new(
        config.rate_limit_window(),
        config.rate_limit_max,
    ));
    let pruner = spawn_limiter_pruner(limiter.clone());

    let state = AppState::new(Arc::new(LinkService::new(Arc::new(link_repository))));
    let options = RouterOptions {
        cors_origin: config.cors_origin()?,
        rate_limit: RateLimitState::new(limiter, config.behind_proxy),
        body_limit: config.body_limit_bytes,
        static_dir: config.static_dir.clone(),
    };

    let app = app_router(state, options);

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server running on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pruner.abort();
    tracing::info!("Server stopped");

    Ok(())
}

/// Builds the link repository and makes sure its table exists.
///
/// `run` calls this before binding the listener, so a failure here means the
/// server never accepts connections.
///
/// # Errors
///
/// Returns an error if the `links` table cannot be created.
pub async fn prepare_storage(pool: PgPool, query_timeout: Duration) -> Result<PgLinkRepository> {
    let link_repository = PgLinkRepository::new(Arc::new(pool)).with_query_timeout(query_timeout);

    if let Err(e) = link_repository.ensure_schema().await {
        tracing::error!(error = %e, "Error initializing database");
        return Err(anyhow::Error::new(e).context("Database schema initialization failed"));
    }
    tracing::info!("Database initialized successfully");

    Ok(link_repository)
}

/// Periodically drops rate-limit windows that have expired.
fn spawn_limiter_pruner(limiter: Arc<FixedWindowLimiter>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = limiter.prune_expired(tokio::time::Instant::now());
            if removed > 0 {
                tracing::debug!(removed, "pruned expired rate-limit windows");
            }
        }
    })
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
