//! Handlers for team performance snapshots.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use qalab_core::error::CoreError;
use qalab_core::pagination::{clamp_limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use qalab_core::types::DbId;
use qalab_db::models::performance_metric::MetricsHistoryParams;
use qalab_db::repositories::{PerformanceMetricRepo, TeamRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_team_exists(state: &AppState, team_id: DbId) -> AppResult<()> {
    TeamRepo::find_by_id(&state.pool, team_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Team", team_id)))?;
    Ok(())
}

/// GET /teams/{team_id}/metrics/latest
pub async fn get_latest_metrics(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_team_exists(&state, team_id).await?;

    let latest = PerformanceMetricRepo::find_latest(&state.pool, team_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("PerformanceMetrics", team_id)))?;

    Ok(Json(DataResponse { data: latest }))
}

/// GET /teams/{team_id}/metrics/history?from=&to=&limit=
///
/// Newest first. `limit` defaults to 50 and is capped at 500.
pub async fn get_metrics_history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<DbId>,
    Query(params): Query<MetricsHistoryParams>,
) -> AppResult<impl IntoResponse> {
    ensure_team_exists(&state, team_id).await?;

    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from > to {
            return Err(AppError::BadRequest("'from' must not be after 'to'".into()));
        }
    }
    let limit = clamp_limit(params.limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);

    let history =
        PerformanceMetricRepo::history(&state.pool, team_id, params.from, params.to, limit).await?;

    Ok(Json(DataResponse { data: history }))
}
