//! Health report returned by `GET /health`.

use serde::Serialize;

/// Overall service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

/// Outcome of a single dependency probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub version: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: Probe,
}

#[derive(Debug, Serialize)]
pub struct Probe {
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl Probe {
    pub fn ok(message: &'static str) -> Self {
        Self {
            status: ProbeStatus::Ok,
            message: Some(message),
        }
    }

    pub fn failed(message: &'static str) -> Self {
        Self {
            status: ProbeStatus::Error,
            message: Some(message),
        }
    }
}

impl HealthChecks {
    /// `Healthy` only when every probe succeeded.
    pub fn overall(&self) -> ServiceStatus {
        match self.database.status {
            ProbeStatus::Ok => ServiceStatus::Healthy,
            ProbeStatus::Error => ServiceStatus::Degraded,
        }
    }
}
