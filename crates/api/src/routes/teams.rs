//! Route definitions for per-team performance metrics.

use axum::routing::get;
use axum::Router;

use crate::handlers::metrics;
use crate::state::AppState;

/// Team routes mounted at `/teams`.
///
/// ```text
/// GET  /{team_id}/metrics/latest    -> get_latest_metrics
/// GET  /{team_id}/metrics/history   -> get_metrics_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{team_id}/metrics/latest", get(metrics::get_latest_metrics))
        .route("/{team_id}/metrics/history", get(metrics::get_metrics_history))
}
