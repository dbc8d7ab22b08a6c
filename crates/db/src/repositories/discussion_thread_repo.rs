//! Repository for the `discussion_threads` and `discussion_comments` tables.
//!
//! Comments are append-only rows. Each insert is a single statement, so
//! concurrent writers to one thread never overwrite each other.

use qalab_core::discussion::{Comment, ParentType};
use qalab_core::types::DbId;
use sqlx::PgPool;

use crate::models::discussion_thread::{DiscussionComment, DiscussionThread};

/// Column list for `discussion_threads` queries.
const COLUMNS: &str = "id, parent_type, parent_id, author_id, created_at, updated_at";

/// Column list for `discussion_comments` queries.
const COMMENT_COLUMNS: &str = "id, thread_id, parent_comment_id, author_id, content, created_at";

pub struct DiscussionThreadRepo;

impl DiscussionThreadRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DiscussionThread>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM discussion_threads WHERE id = $1");
        sqlx::query_as::<_, DiscussionThread>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_parent(
        pool: &PgPool,
        parent_type: ParentType,
        parent_id: DbId,
    ) -> Result<Option<DiscussionThread>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discussion_threads WHERE parent_type = $1 AND parent_id = $2"
        );
        sqlx::query_as::<_, DiscussionThread>(&query)
            .bind(parent_type.as_str())
            .bind(parent_id)
            .fetch_optional(pool)
            .await
    }

    /// All threads attached to one kind of parent, newest first.
    pub async fn list_by_parent_type(
        pool: &PgPool,
        parent_type: ParentType,
    ) -> Result<Vec<DiscussionThread>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discussion_threads WHERE parent_type = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, DiscussionThread>(&query)
            .bind(parent_type.as_str())
            .fetch_all(pool)
            .await
    }

    /// Create an empty thread for the parent, or return the one that exists.
    ///
    /// The boolean is `true` when this call created the row.
    pub async fn create_if_absent(
        pool: &PgPool,
        parent_type: ParentType,
        parent_id: DbId,
        author_id: DbId,
    ) -> Result<(DiscussionThread, bool), sqlx::Error> {
        let query = format!(
            "INSERT INTO discussion_threads (parent_type, parent_id, author_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_discussion_threads_parent DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, DiscussionThread>(&query)
            .bind(parent_type.as_str())
            .bind(parent_id)
            .bind(author_id)
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(thread) => Ok((thread, true)),
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM discussion_threads WHERE parent_type = $1 AND parent_id = $2"
                );
                let existing = sqlx::query_as::<_, DiscussionThread>(&query)
                    .bind(parent_type.as_str())
                    .bind(parent_id)
                    .fetch_one(pool)
                    .await?;
                Ok((existing, false))
            }
        }
    }

    /// Every comment of a thread, oldest first.
    pub async fn comments(
        pool: &PgPool,
        thread_id: DbId,
    ) -> Result<Vec<DiscussionComment>, sqlx::Error> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM discussion_comments WHERE thread_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, DiscussionComment>(&query)
            .bind(thread_id)
            .fetch_all(pool)
            .await
    }

    /// Every comment of several threads, oldest first within each thread.
    pub async fn comments_for_threads(
        pool: &PgPool,
        thread_ids: &[DbId],
    ) -> Result<Vec<DiscussionComment>, sqlx::Error> {
        if thread_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM discussion_comments WHERE thread_id = ANY($1) \
             ORDER BY thread_id, created_at, id"
        );
        sqlx::query_as::<_, DiscussionComment>(&query)
            .bind(thread_ids)
            .fetch_all(pool)
            .await
    }

    /// Append a comment to a thread.
    ///
    /// A reply is stored only if its parent comment belongs to the same
    /// thread. Returns `None` when the thread or the parent comment does not
    /// exist. A stored comment bumps the thread's `updated_at`.
    pub async fn add_comment(
        pool: &PgPool,
        thread_id: DbId,
        comment: &Comment,
    ) -> Result<Option<DiscussionComment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO discussion_comments \
                (id, thread_id, parent_comment_id, author_id, content, created_at) \
             SELECT $1::uuid, $2::bigint, $3::uuid, $4::bigint, $5::text, $6::timestamptz \
             WHERE EXISTS (SELECT 1 FROM discussion_threads WHERE id = $2) \
               AND ($3::uuid IS NULL OR EXISTS ( \
                    SELECT 1 FROM discussion_comments WHERE thread_id = $2 AND id = $3)) \
             RETURNING {COMMENT_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, DiscussionComment>(&query)
            .bind(comment.id)
            .bind(thread_id)
            .bind(comment.parent_id)
            .bind(comment.author_id)
            .bind(&comment.content)
            .bind(comment.created_at)
            .fetch_optional(&mut *tx)
            .await?;

        if inserted.is_some() {
            sqlx::query("UPDATE discussion_threads SET updated_at = now() WHERE id = $1")
                .bind(thread_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Delete a thread. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM discussion_threads WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
