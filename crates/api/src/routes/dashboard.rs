//! Route definitions for the instructor and team dashboards.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Dashboard routes mounted at `/dashboard`.
///
/// ```text
/// GET  /instructor          -> instructor_dashboard (instructor only)
/// GET  /teams/{team_id}     -> team_dashboard
/// GET  /me                  -> my_team_dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/instructor", get(dashboard::instructor_dashboard))
        .route("/teams/{team_id}", get(dashboard::team_dashboard))
        .route("/me", get(dashboard::my_team_dashboard))
}
