//! Liveness endpoint for load balancers and the deployment smoke check.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` when Postgres cannot be reached.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether an aggregation pass (nightly or on-demand) is in progress.
    pub aggregation_running: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = qalab_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        aggregation_running: state.aggregator.is_running(),
    })
}

/// `GET /health`, mounted beside `/api/v1` and open without a token.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
