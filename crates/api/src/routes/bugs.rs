//! Route definitions for bug logging.
//!
//! Mounted at `/bugs` by `api_routes()`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::bugs;
use crate::state::AppState;

/// ```text
/// POST   /                  -> create_bug
/// GET    /{id}/history      -> get_bug_history
/// PUT    /{id}/status       -> change_bug_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(bugs::create_bug))
        .route("/{id}/history", get(bugs::get_bug_history))
        .route("/{id}/status", put(bugs::change_bug_status))
}
