//! Discussion thread and comment entity models and DTOs.

use qalab_core::discussion::{AuthorSummary, Comment, CommentView, ParentType};
use qalab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `discussion_threads` table.
#[derive(Debug, Clone, FromRow)]
pub struct DiscussionThread {
    pub id: DbId,
    pub parent_type: String,
    pub parent_id: DbId,
    pub author_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `discussion_comments` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DiscussionComment {
    pub id: Uuid,
    pub thread_id: DbId,
    pub parent_comment_id: Option<Uuid>,
    pub author_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}

impl From<DiscussionComment> for Comment {
    fn from(row: DiscussionComment) -> Self {
        Comment {
            id: row.id,
            parent_id: row.parent_comment_id,
            author_id: row.author_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// DTO for opening (or fetching) the thread of a bug or test case.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDiscussionThread {
    pub parent_type: String,
    pub parent_id: DbId,
}

/// DTO for a new comment or reply.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub content: String,
}

/// Query parameters for listing threads by parent.
#[derive(Debug, Deserialize)]
pub struct ThreadListParams {
    pub parent_type: String,
    pub parent_id: Option<DbId>,
}

/// A thread with every author resolved, as returned to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadView {
    pub id: DbId,
    pub parent_type: ParentType,
    pub parent_id: DbId,
    pub author: AuthorSummary,
    pub comments: Vec<CommentView>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
