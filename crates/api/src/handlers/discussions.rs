//! Handlers for discussion threads attached to bugs and test cases.
//!
//! A parent has at most one thread. Comments are stored flat and nest to any
//! depth on read; every response resolves comment authors to their public
//! identity.

use std::collections::{BTreeSet, HashMap};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use qalab_core::discussion::{self, AuthorSummary, Comment, ParentType};
use qalab_core::error::CoreError;
use qalab_core::types::DbId;
use qalab_db::models::discussion_thread::{
    CreateComment, CreateDiscussionThread, DiscussionThread, ThreadListParams, ThreadView,
};
use qalab_db::repositories::{BugRepo, DiscussionThreadRepo, TestCaseRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_thread(state: &AppState, id: DbId) -> AppResult<DiscussionThread> {
    DiscussionThreadRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("DiscussionThread", id)))
}

async fn ensure_parent_exists(state: &AppState, parent_type: ParentType, parent_id: DbId) -> AppResult<()> {
    let exists = match parent_type {
        ParentType::Bug => BugRepo::exists(&state.pool, parent_id).await?,
        ParentType::TestCase => TestCaseRepo::exists(&state.pool, parent_id).await?,
    };
    if !exists {
        return Err(AppError::Core(CoreError::not_found(
            parent_type.as_str(),
            parent_id,
        )));
    }
    Ok(())
}

/// Resolve thread and comment authors with one user lookup for the batch.
async fn build_thread_views(
    state: &AppState,
    threads: Vec<DiscussionThread>,
) -> AppResult<Vec<ThreadView>> {
    let thread_ids: Vec<DbId> = threads.iter().map(|t| t.id).collect();
    let mut comments_by_thread: HashMap<DbId, Vec<Comment>> = HashMap::new();
    for row in DiscussionThreadRepo::comments_for_threads(&state.pool, &thread_ids).await? {
        comments_by_thread
            .entry(row.thread_id)
            .or_default()
            .push(Comment::from(row));
    }

    let mut author_ids: BTreeSet<DbId> = threads.iter().map(|t| t.author_id).collect();
    discussion::collect_author_ids(comments_by_thread.values().flatten(), &mut author_ids);
    let ids: Vec<DbId> = author_ids.into_iter().collect();
    let authors: HashMap<DbId, AuthorSummary> = UserRepo::find_many(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|user| (user.id, AuthorSummary::from(user)))
        .collect();

    threads
        .into_iter()
        .map(|thread| {
            let parent_type = ParentType::parse(&thread.parent_type).map_err(|_| {
                CoreError::Internal(format!(
                    "Thread {} has unknown parent type '{}'",
                    thread.id, thread.parent_type
                ))
            })?;
            let comments = comments_by_thread.remove(&thread.id).unwrap_or_default();
            Ok::<_, AppError>(ThreadView {
                id: thread.id,
                parent_type,
                parent_id: thread.parent_id,
                author: authors
                    .get(&thread.author_id)
                    .cloned()
                    .unwrap_or_else(|| AuthorSummary::unknown(thread.author_id)),
                comments: discussion::populate(&comments, &authors),
                created_at: thread.created_at,
                updated_at: thread.updated_at,
            })
        })
        .collect()
}

async fn build_thread_view(state: &AppState, thread: DiscussionThread) -> AppResult<ThreadView> {
    let mut views = build_thread_views(state, vec![thread]).await?;
    views
        .pop()
        .ok_or_else(|| AppError::InternalError("Thread view was not built".into()))
}

/// Store a comment (or a reply when `parent_comment_id` is set) and return
/// the refreshed thread.
async fn post_comment(
    state: &AppState,
    auth: &AuthUser,
    thread_id: DbId,
    parent_comment_id: Option<Uuid>,
    input: CreateComment,
) -> AppResult<ThreadView> {
    let content = discussion::validate_content(&input.content)?;
    load_thread(state, thread_id).await?;

    let comment = Comment::new(parent_comment_id, auth.user_id, content, Utc::now());
    let stored = DiscussionThreadRepo::add_comment(&state.pool, thread_id, &comment).await?;
    if stored.is_none() {
        return Err(match parent_comment_id {
            Some(parent) => AppError::Core(CoreError::not_found("Comment", parent)),
            None => AppError::Core(CoreError::not_found("DiscussionThread", thread_id)),
        });
    }

    tracing::info!(
        thread_id,
        comment_id = %comment.id,
        parent_comment_id = ?parent_comment_id,
        user_id = auth.user_id,
        "Comment added",
    );

    let thread = load_thread(state, thread_id).await?;
    build_thread_view(state, thread).await
}

// ---------------------------------------------------------------------------
// GET /discussions?parent_type=..&parent_id=..
// ---------------------------------------------------------------------------

/// With `parent_id`, the single thread for that parent; without, every
/// thread for the parent type.
pub async fn list_threads(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ThreadListParams>,
) -> AppResult<Response> {
    match params.parent_id {
        Some(parent_id) => {
            let parent_type = discussion::validate_parent(&params.parent_type, parent_id)?;
            let thread = DiscussionThreadRepo::find_by_parent(&state.pool, parent_type, parent_id)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::not_found(
                        "DiscussionThread",
                        format!("{}/{parent_id}", parent_type.as_str()),
                    ))
                })?;
            let view = build_thread_view(&state, thread).await?;
            Ok(Json(DataResponse { data: view }).into_response())
        }
        None => {
            let parent_type = ParentType::parse(&params.parent_type)?;
            let threads = DiscussionThreadRepo::list_by_parent_type(&state.pool, parent_type).await?;
            let views = build_thread_views(&state, threads).await?;
            Ok(Json(DataResponse { data: views }).into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// POST /discussions
// ---------------------------------------------------------------------------

/// Open the thread for a parent, or return it if it already exists.
///
/// Responds 201 when the thread was created by this call, 200 otherwise.
pub async fn get_or_create_thread(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDiscussionThread>,
) -> AppResult<impl IntoResponse> {
    let parent_type = discussion::validate_parent(&input.parent_type, input.parent_id)?;
    ensure_parent_exists(&state, parent_type, input.parent_id).await?;

    let (thread, created) =
        DiscussionThreadRepo::create_if_absent(&state.pool, parent_type, input.parent_id, auth.user_id)
            .await?;

    if created {
        tracing::info!(
            thread_id = thread.id,
            parent_type = parent_type.as_str(),
            parent_id = input.parent_id,
            user_id = auth.user_id,
            "Discussion thread opened",
        );
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    let view = build_thread_view(&state, thread).await?;
    Ok((status, Json(DataResponse { data: view })))
}

// ---------------------------------------------------------------------------
// GET /discussions/{id}
// ---------------------------------------------------------------------------

pub async fn get_thread(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let thread = load_thread(&state, id).await?;
    let view = build_thread_view(&state, thread).await?;
    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /discussions/{id}/comments
// ---------------------------------------------------------------------------

/// Append a top-level comment by the caller.
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let view = post_comment(&state, &auth, id, None, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

// ---------------------------------------------------------------------------
// POST /discussions/{id}/comments/{comment_id}/replies
// ---------------------------------------------------------------------------

/// Reply to any comment in the thread, at any depth.
pub async fn add_reply(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, parent_comment_id)): Path<(DbId, Uuid)>,
    Json(input): Json<CreateComment>,
) -> AppResult<impl IntoResponse> {
    let view = post_comment(&state, &auth, id, Some(parent_comment_id), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

// ---------------------------------------------------------------------------
// DELETE /discussions/{id}
// ---------------------------------------------------------------------------

/// Delete a thread with all of its comments. Only its author may do this.
pub async fn delete_thread(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let thread = load_thread(&state, id).await?;
    discussion::ensure_thread_author(thread.author_id, auth.user_id)?;

    if !DiscussionThreadRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("DiscussionThread", id)));
    }

    tracing::info!(thread_id = id, user_id = auth.user_id, "Discussion thread deleted");
    Ok(StatusCode::NO_CONTENT)
}
