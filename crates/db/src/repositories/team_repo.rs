//! Repository for the `teams` and `team_students` tables.

use qalab_core::types::DbId;
use sqlx::PgPool;

use crate::models::team::{CreateTeam, Team, TeamWithPeriod};

/// Column list for `teams` queries.
const COLUMNS: &str = "id, name, experiment_id, created_at";

/// Provides team lookups and roster resolution.
pub struct TeamRepo;

impl TeamRepo {
    /// Insert a new team, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTeam) -> Result<Team, sqlx::Error> {
        let query = format!("INSERT INTO teams (name, experiment_id) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Team>(&query)
            .bind(&input.name)
            .bind(input.experiment_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE id = $1");
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every team with its experiment's period, in id order.
    pub async fn list_with_period(pool: &PgPool) -> Result<Vec<TeamWithPeriod>, sqlx::Error> {
        sqlx::query_as::<_, TeamWithPeriod>(
            "SELECT t.id, t.name, t.experiment_id, \
                    e.start_date AS period_start, e.end_date AS period_end \
             FROM teams t \
             LEFT JOIN experiments e ON e.id = t.experiment_id \
             ORDER BY t.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Delete a team. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add a student to a team. Adding an existing member is a no-op.
    pub async fn add_student(pool: &PgPool, team_id: DbId, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO team_students (team_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Member user ids of a team.
    pub async fn member_ids(pool: &PgPool, team_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM team_students WHERE team_id = $1 ORDER BY user_id")
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// The team a student belongs to. A student in several teams resolves
    /// to the oldest one.
    pub async fn find_for_student(pool: &PgPool, user_id: DbId) -> Result<Option<Team>, sqlx::Error> {
        sqlx::query_as::<_, Team>(
            "SELECT t.id, t.name, t.experiment_id, t.created_at \
             FROM teams t \
             JOIN team_students ts ON ts.team_id = t.id \
             WHERE ts.user_id = $1 \
             ORDER BY t.id \
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM teams")
            .fetch_one(pool)
            .await
    }
}
