pub mod bugs;
pub mod dashboard;
pub mod discussions;
pub mod health;
pub mod reports;
pub mod teams;
pub mod test_cases;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /reports/generate                                run aggregation (POST, instructor)
/// /reports                                         list stored reports
/// /reports/export.csv                              CSV download of all reports
///
/// /dashboard/instructor                            cross-team dashboard (instructor)
/// /dashboard/teams/{team_id}                       one team's dashboard
/// /dashboard/me                                    caller's own team dashboard
///
/// /teams/{team_id}/metrics/latest                  current snapshot
/// /teams/{team_id}/metrics/history                 daily history (?from, to, limit)
///
/// /bugs                                            log a bug (POST)
/// /bugs/{id}/history                               status audit log
/// /bugs/{id}/status                                change status (PUT)
///
/// /test-cases/{id}/executions                      list, record (GET, POST)
/// /test-cases/{id}/executions/{index}              remove by position (DELETE)
///
/// /discussions                                     list, get-or-create (GET, POST)
/// /discussions/{id}                                get, delete
/// /discussions/{id}/comments                       add comment (POST)
/// /discussions/{id}/comments/{comment_id}/replies  add reply (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/reports", reports::router())
        .nest("/dashboard", dashboard::router())
        .nest("/teams", teams::router())
        .nest("/bugs", bugs::router())
        .nest("/test-cases", test_cases::router())
        .nest("/discussions", discussions::router())
}
