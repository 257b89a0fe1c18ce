//! Banner and health endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, warn};

use doorscan_core::defaults::SERVER_BANNER;

use crate::AppState;

/// Health probe body.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    /// `connected` or `unavailable`
    pub database: String,
}

/// Plain-text server banner.
#[utoipa::path(get, path = "/", tag = "System",
    responses((status = 200, description = "Server banner", body = String)))]
pub async fn root() -> &'static str {
    info!(
        subsystem = "api",
        component = "system",
        op = "root",
        "Root endpoint hit"
    );
    SERVER_BANNER
}

/// Liveness probe. Reports database reachability; always answers 200.
#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Service health", body = HealthStatus)))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    doorscan_db::log_pool_metrics(state.db.pool());
    let database = match state.db.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(subsystem = "api", error = %e, "Health check could not reach the database");
            "unavailable"
        }
    };
    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    })
}
