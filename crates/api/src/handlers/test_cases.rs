//! Handlers for recording and removing test-case executions.
//!
//! Executions form an ordered list per test case. Removal is by zero-based
//! position and is destructive.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use qalab_core::error::CoreError;
use qalab_core::test_execution;
use qalab_core::types::DbId;
use qalab_db::models::test_case::CreateTestExecution;
use qalab_db::repositories::TestCaseRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_test_case_exists(state: &AppState, id: DbId) -> AppResult<()> {
    if !TestCaseRepo::exists(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("TestCase", id)));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// POST /test-cases/{id}/executions
// ---------------------------------------------------------------------------

/// Append an execution. The executing team must be assigned to the test case.
pub async fn add_execution(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<CreateTestExecution>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref status) = input.status {
        test_execution::validate_execution_status(status)?;
    }
    test_execution::validate_execution_text("actual_result", input.actual_result.as_deref())?;
    test_execution::validate_execution_text("comments", input.comments.as_deref())?;

    ensure_test_case_exists(&state, id).await?;
    if !TestCaseRepo::is_assigned(&state.pool, id, input.team_id).await? {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Team {} is not assigned to test case {id}",
            input.team_id
        ))));
    }

    if input.executed_by.is_none() {
        input.executed_by = Some(auth.user_id);
    }
    let execution = TestCaseRepo::add_execution(&state.pool, id, &input).await?;

    tracing::info!(
        test_case_id = id,
        team_id = execution.team_id,
        status = %execution.status,
        user_id = auth.user_id,
        "Test execution recorded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: execution })))
}

// ---------------------------------------------------------------------------
// GET /test-cases/{id}/executions
// ---------------------------------------------------------------------------

pub async fn list_executions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_test_case_exists(&state, id).await?;
    let executions = TestCaseRepo::list_executions(&state.pool, id).await?;
    Ok(Json(DataResponse { data: executions }))
}

// ---------------------------------------------------------------------------
// DELETE /test-cases/{id}/executions/{index}
// ---------------------------------------------------------------------------

/// Remove the execution at `index`, returning the removed record.
pub async fn remove_execution(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, index)): Path<(DbId, i64)>,
) -> AppResult<impl IntoResponse> {
    ensure_test_case_exists(&state, id).await?;

    let current = TestCaseRepo::list_executions(&state.pool, id).await?;
    let position = test_execution::validate_execution_index(index, current.len())?;

    // The list may have shrunk since it was read.
    let removed = TestCaseRepo::remove_execution_at(&state.pool, id, position as i64)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Invalid execution index {index}"
            )))
        })?;

    tracing::info!(
        test_case_id = id,
        index,
        execution_id = removed.id,
        user_id = auth.user_id,
        "Test execution removed",
    );

    Ok(Json(DataResponse { data: removed }))
}
