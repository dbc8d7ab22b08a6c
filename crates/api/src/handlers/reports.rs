//! Handlers for QA report generation, listing and export.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use qalab_core::qa_metrics::QaReportDraft;
use qalab_core::report_export::{render_reports_csv, REPORT_CSV_FILENAME};
use qalab_db::repositories::QaReportRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /reports/generate
// ---------------------------------------------------------------------------

/// Run the aggregation pipeline now and return its outcome.
pub async fn generate_reports(
    RequireInstructor(user): RequireInstructor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.aggregator.run().await?;

    tracing::info!(
        user_id = user.user_id,
        teams_processed = outcome.teams_processed,
        reports_removed = outcome.reports_removed,
        "QA reports regenerated on request",
    );

    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// GET /reports
// ---------------------------------------------------------------------------

/// Current QA reports, one per team, ordered by team name.
pub async fn list_reports(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reports = QaReportRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: reports }))
}

// ---------------------------------------------------------------------------
// GET /reports/export.csv
// ---------------------------------------------------------------------------

/// Download the current QA reports as CSV.
pub async fn export_reports_csv(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reports = QaReportRepo::list_all(&state.pool).await?;
    let drafts: Vec<QaReportDraft> = reports.iter().map(|r| r.to_draft()).collect();
    let csv = render_reports_csv(&drafts)?;

    tracing::info!(user_id = auth.user_id, rows = drafts.len(), "QA report CSV exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_CSV_FILENAME}\""),
            ),
        ],
        csv,
    ))
}
