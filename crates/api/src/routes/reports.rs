//! Route definitions for QA report generation and export.
//!
//! Mounted at `/reports` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// ```text
/// POST   /generate          -> generate_reports (instructor only)
/// GET    /                  -> list_reports
/// GET    /export.csv        -> export_reports_csv
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reports::list_reports))
        .route("/generate", post(reports::generate_reports))
        .route("/export.csv", get(reports::export_reports_csv))
}
