//! Repository for the `bugs` table and its status audit log.
//!
//! Every status a bug has held is recorded in `bug_status_history`. The
//! initial `open` entry is written in the same transaction as the bug, and
//! later entries are appended only when the status actually changes.

use qalab_core::bug_status::{DEFAULT_SEVERITY, STATUS_OPEN};
use qalab_core::types::DbId;
use sqlx::PgPool;

use crate::models::bug::{Bug, BugStatusEntry, ChangeBugStatus, CreateBug, RecentBug};

/// Column list for `bugs` queries.
const COLUMNS: &str = "\
    id, title, description, reproduction_steps, screenshots, severity, reporter_id, \
    team_id, current_status, created_at, updated_at";

/// Column list for `bug_status_history` queries.
const HISTORY_COLUMNS: &str = "id, bug_id, status, changed_by, changed_at, comment";

pub struct BugRepo;

impl BugRepo {
    /// Log a new bug as `open` and write its first audit entry.
    pub async fn create(pool: &PgPool, reporter_id: DbId, input: &CreateBug) -> Result<Bug, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO bugs \
                (title, description, reproduction_steps, screenshots, severity, reporter_id, team_id, current_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let bug = sqlx::query_as::<_, Bug>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.reproduction_steps)
            .bind(&input.screenshots)
            .bind(input.severity.as_deref().unwrap_or(DEFAULT_SEVERITY))
            .bind(reporter_id)
            .bind(input.team_id)
            .bind(STATUS_OPEN)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO bug_status_history (bug_id, status, changed_by) VALUES ($1, $2, $3)")
            .bind(bug.id)
            .bind(STATUS_OPEN)
            .bind(reporter_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(bug)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Bug>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bugs WHERE id = $1");
        sqlx::query_as::<_, Bug>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bugs WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// All bugs filed against a team, oldest first.
    pub async fn list_for_team(pool: &PgPool, team_id: DbId) -> Result<Vec<Bug>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bugs WHERE team_id = $1 ORDER BY id");
        sqlx::query_as::<_, Bug>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Move a bug to `input.status`.
    ///
    /// The bug row is locked for the duration of the transaction so two
    /// concurrent transitions append their entries in commit order. Setting
    /// the status a bug already holds leaves the audit log untouched.
    /// Returns `None` if the bug does not exist.
    pub async fn change_status(
        pool: &PgPool,
        id: DbId,
        changed_by: DbId,
        input: &ChangeBugStatus,
    ) -> Result<Option<Bug>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT current_status FROM bugs WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        if current != input.status {
            sqlx::query("UPDATE bugs SET current_status = $1 WHERE id = $2")
                .bind(&input.status)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO bug_status_history (bug_id, status, changed_by, comment) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(&input.status)
            .bind(changed_by)
            .bind(&input.comment)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!("SELECT {COLUMNS} FROM bugs WHERE id = $1");
        let bug = sqlx::query_as::<_, Bug>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(bug))
    }

    /// The audit log of a bug in chronological order.
    pub async fn history(pool: &PgPool, bug_id: DbId) -> Result<Vec<BugStatusEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM bug_status_history WHERE bug_id = $1 ORDER BY changed_at, id"
        );
        sqlx::query_as::<_, BugStatusEntry>(&query)
            .bind(bug_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM bugs")
            .fetch_one(pool)
            .await
    }

    pub async fn count_for_team(pool: &PgPool, team_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM bugs WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(pool)
            .await
    }

    /// The newest bugs with their team names, most recent first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<RecentBug>, sqlx::Error> {
        sqlx::query_as::<_, RecentBug>(
            "SELECT b.id, b.title, t.name AS team_name, b.created_at \
             FROM bugs b \
             LEFT JOIN teams t ON t.id = b.team_id \
             ORDER BY b.created_at DESC, b.id DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
