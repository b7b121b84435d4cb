//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::db::MenuStore;
use crate::state::AppState;

/// Readiness report.
#[derive(Debug, Serialize)]
pub struct Readiness {
    pub database: bool,
    pub cache: bool,
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Pings the store and round-trips a probe through the cache. Returns 503
/// Service Unavailable if either fails.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Readiness>) {
    let database = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness: store ping failed");
            false
        }
    };
    let cache = state.menu().cache_healthy().await;

    let status = if database && cache {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(Readiness { database, cache }))
}
