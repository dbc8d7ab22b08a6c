//! Repository for the `experiments` table.

use qalab_core::types::DbId;
use sqlx::PgPool;

use crate::models::experiment::{CreateExperiment, Experiment};

/// Column list for `experiments` queries.
const COLUMNS: &str = "id, title, description, methodology, start_date, end_date, created_at";

pub struct ExperimentRepo;

impl ExperimentRepo {
    /// Insert a new experiment, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateExperiment) -> Result<Experiment, sqlx::Error> {
        let query = format!(
            "INSERT INTO experiments (title, description, methodology, start_date, end_date) \
             VALUES ($1, COALESCE($2, ''), $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Experiment>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.methodology)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Experiment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM experiments WHERE id = $1");
        sqlx::query_as::<_, Experiment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM experiments")
            .fetch_one(pool)
            .await
    }

    /// The newest experiments, most recent first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Experiment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM experiments ORDER BY created_at DESC, id DESC LIMIT $1");
        sqlx::query_as::<_, Experiment>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
