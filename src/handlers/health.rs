//! Health check handlers
//! Liveness (/health) and readiness (/ready) probes

use axum::{extract::State, http::StatusCode, Json};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::{db, middleware::AppState};

static APP_START_TIME: OnceCell<Instant> = OnceCell::new();

/// Record the process start time; called once from main
pub fn set_start_time() {
    let _ = APP_START_TIME.set(Instant::now());
}

fn uptime_secs() -> u64 {
    APP_START_TIME.get().map_or(0, |start| start.elapsed().as_secs())
}

/// Liveness response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: Vec<HealthCheck>,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Liveness probe: fast, no dependency checks
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime_secs(),
    })
}

/// Readiness probe: verifies the identity store is reachable
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    db::record_pool_metrics(&state.db);

    let (ready, check) = match db::health_check(&state.db).await {
        db::HealthStatus::Healthy => (
            true,
            HealthCheck {
                name: "database".to_string(),
                status: "ok".to_string(),
                message: None,
            },
        ),
        db::HealthStatus::Unhealthy(msg) => (
            false,
            HealthCheck {
                name: "database".to_string(),
                status: "failed".to_string(),
                message: Some(msg),
            },
        ),
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready,
            checks: vec![check],
        }),
    )
}
