//! Route definitions for discussion threads.
//!
//! Mounted at `/discussions` by `api_routes()`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::discussions;
use crate::state::AppState;

/// ```text
/// GET    /                                   -> list_threads
/// POST   /                                   -> get_or_create_thread
/// GET    /{id}                               -> get_thread
/// DELETE /{id}                               -> delete_thread
/// POST   /{id}/comments                      -> add_comment
/// POST   /{id}/comments/{comment_id}/replies -> add_reply
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(discussions::list_threads).post(discussions::get_or_create_thread),
        )
        .route(
            "/{id}",
            get(discussions::get_thread).delete(discussions::delete_thread),
        )
        .route("/{id}/comments", post(discussions::add_comment))
        .route(
            "/{id}/comments/{comment_id}/replies",
            post(discussions::add_reply),
        )
}
