//! Handlers for logging bugs and moving them through their statuses.
//!
//! Every status change is recorded in the bug's append-only audit log.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use qalab_core::bug_status;
use qalab_core::error::CoreError;
use qalab_core::types::DbId;
use qalab_db::models::bug::{ChangeBugStatus, CreateBug};
use qalab_db::repositories::{BugRepo, TeamRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /bugs
// ---------------------------------------------------------------------------

/// Log a new bug. The caller is recorded as reporter.
pub async fn create_bug(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateBug>,
) -> AppResult<impl IntoResponse> {
    bug_status::validate_new_bug(&input.title, &input.description, &input.reproduction_steps)?;
    if let Some(ref severity) = input.severity {
        bug_status::validate_severity(severity)?;
    }

    TeamRepo::find_by_id(&state.pool, input.team_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Team", input.team_id)))?;

    let bug = BugRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        bug_id = bug.id,
        team_id = bug.team_id,
        user_id = auth.user_id,
        "Bug logged",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: bug })))
}

// ---------------------------------------------------------------------------
// GET /bugs/{id}/history
// ---------------------------------------------------------------------------

/// The bug's status audit log, oldest entry first.
pub async fn get_bug_history(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !BugRepo::exists(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("Bug", id)));
    }
    let history = BugRepo::history(&state.pool, id).await?;
    Ok(Json(DataResponse { data: history }))
}

// ---------------------------------------------------------------------------
// PUT /bugs/{id}/status
// ---------------------------------------------------------------------------

/// Move a bug to a new status, appending to its audit log.
pub async fn change_bug_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ChangeBugStatus>,
) -> AppResult<impl IntoResponse> {
    bug_status::validate_status(&input.status)?;
    bug_status::validate_status_comment(input.comment.as_deref())?;

    let bug = BugRepo::change_status(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Bug", id)))?;

    tracing::info!(
        bug_id = id,
        status = %bug.current_status,
        user_id = auth.user_id,
        "Bug status changed",
    );

    Ok(Json(DataResponse { data: bug }))
}
