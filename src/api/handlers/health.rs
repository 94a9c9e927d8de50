//! Service health endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{HealthChecks, HealthResponse, Probe, ServiceStatus};
use crate::state::AppState;

/// Reports whether the service can reach its database.
///
/// `GET /health` sits outside `/api` and is not rate limited. Responds
/// `200 OK` when every probe passes and `503 Service Unavailable` otherwise.
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": { "database": { "status": "ok", "message": "Connected" } }
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let checks = HealthChecks {
        database: probe_database(&state).await,
    };
    let status = checks.overall();

    let code = match status {
        ServiceStatus::Healthy => StatusCode::OK,
        ServiceStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }),
    )
}

async fn probe_database(state: &AppState) -> Probe {
    match state.link_service.check_storage().await {
        Ok(()) => Probe::ok("Connected"),
        Err(e) => {
            tracing::warn!(error = %e, "health probe failed: database");
            Probe::failed("Database unreachable")
        }
    }
}
