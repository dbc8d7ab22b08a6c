use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::test_cases;
use crate::state::AppState;

/// Test case routes mounted at `/test-cases`.
///
/// ```text
/// GET    /{id}/executions            -> list_executions
/// POST   /{id}/executions            -> add_execution
/// DELETE /{id}/executions/{index}    -> remove_execution
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/executions",
            get(test_cases::list_executions).post(test_cases::add_execution),
        )
        .route("/{id}/executions/{index}", delete(test_cases::remove_execution))
}
