//! Health check handlers for service monitoring.
//!
//! `/health` probes the history store; `/live` only shows the process is
//! serving requests.

use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use relay_core::HistoryStore;
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::state::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status
    pub status: HealthStatus,
    /// Timestamp when health check was performed
    pub timestamp: DateTime<Utc>,
    /// Individual component health checks
    pub checks: HealthChecks,
    /// Service version information
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Critical systems failing
    Unhealthy,
}

/// Individual component health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// History store connectivity
    pub database: ComponentHealth,
}

/// Health status for individual components.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: ComponentStatus,
    /// Optional error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response time in milliseconds
    pub response_time_ms: u64,
}

/// Component-level health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is healthy
    Up,
    /// Component is experiencing issues
    Down,
}

async fn check_database(store: &dyn HistoryStore) -> ComponentHealth {
    let start_time = Instant::now();
    let result = store.health_check().await;
    let response_time_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(()) => {
            debug!("Database health check passed");
            ComponentHealth { status: ComponentStatus::Up, message: None, response_time_ms }
        },
        Err(e) => {
            error!("Database health check failed: {}", e);
            ComponentHealth {
                status: ComponentStatus::Down,
                message: Some(format!("Database connection failed: {e}")),
                response_time_ms,
            }
        },
    }
}

/// Health check endpoint handler.
///
/// Returns 200 when the store answers its probe and 503 otherwise.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = check_database(state.store.as_ref()).await;

    let status = match database.status {
        ComponentStatus::Up => HealthStatus::Healthy,
        ComponentStatus::Down => HealthStatus::Unhealthy,
    };

    let response = HealthResponse {
        status,
        timestamp: Utc::now(),
        checks: HealthChecks { database },
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let status_code = match response.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    debug!(status = ?response.status, "Health check completed");

    (status_code, Json(response)).into_response()
}

/// Liveness check endpoint.
///
/// Does not touch external dependencies.
#[instrument(name = "liveness_check")]
pub async fn liveness_check() -> Response {
    let response = serde_json::json!({
        "status": "alive",
        "timestamp": Utc::now(),
        "service": "relay-api"
    });

    (StatusCode::OK, Json(response)).into_response()
}
