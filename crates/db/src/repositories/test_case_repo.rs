//! Repository for `test_cases`, their team assignments, and executions.

use qalab_core::test_execution::DEFAULT_EXECUTION_STATUS;
use qalab_core::types::DbId;
use sqlx::PgPool;

use crate::models::test_case::{CreateTestCase, CreateTestExecution, TestCase, TestExecution};

/// Column list for `test_cases` queries.
const COLUMNS: &str = "id, title, description, steps, author_id, created_at, updated_at";

/// Column list for `test_executions` queries.
const EXECUTION_COLUMNS: &str = "\
    id, test_case_id, team_id, executed_by, status, actual_result, comments, executed_at";

pub struct TestCaseRepo;

impl TestCaseRepo {
    /// Insert a test case and its team assignments in one transaction.
    pub async fn create(pool: &PgPool, author_id: DbId, input: &CreateTestCase) -> Result<TestCase, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO test_cases (title, description, steps, author_id) \
             VALUES ($1, COALESCE($2, ''), $3, $4) \
             RETURNING {COLUMNS}"
        );
        let test_case = sqlx::query_as::<_, TestCase>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.steps)
            .bind(author_id)
            .fetch_one(&mut *tx)
            .await?;

        if !input.assigned_team_ids.is_empty() {
            sqlx::query(
                "INSERT INTO test_case_teams (test_case_id, team_id) \
                 SELECT $1, UNNEST($2::BIGINT[]) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(test_case.id)
            .bind(&input.assigned_team_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(test_case)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TestCase>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM test_cases WHERE id = $1");
        sqlx::query_as::<_, TestCase>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM test_cases WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Ids of the test cases assigned to a team.
    pub async fn assigned_ids_for_team(pool: &PgPool, team_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT test_case_id FROM test_case_teams WHERE team_id = $1 ORDER BY test_case_id",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await
    }

    pub async fn is_assigned(pool: &PgPool, test_case_id: DbId, team_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM test_case_teams WHERE test_case_id = $1 AND team_id = $2)",
        )
        .bind(test_case_id)
        .bind(team_id)
        .fetch_one(pool)
        .await
    }

    /// Append an execution to the end of a test case's list.
    pub async fn add_execution(
        pool: &PgPool,
        test_case_id: DbId,
        input: &CreateTestExecution,
    ) -> Result<TestExecution, sqlx::Error> {
        let query = format!(
            "INSERT INTO test_executions \
                (test_case_id, team_id, executed_by, status, actual_result, comments) \
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, '')) \
             RETURNING {EXECUTION_COLUMNS}"
        );
        sqlx::query_as::<_, TestExecution>(&query)
            .bind(test_case_id)
            .bind(input.team_id)
            .bind(input.executed_by)
            .bind(input.status.as_deref().unwrap_or(DEFAULT_EXECUTION_STATUS))
            .bind(&input.actual_result)
            .bind(&input.comments)
            .fetch_one(pool)
            .await
    }

    /// Executions of a test case in list order.
    pub async fn list_executions(pool: &PgPool, test_case_id: DbId) -> Result<Vec<TestExecution>, sqlx::Error> {
        let query = format!(
            "SELECT {EXECUTION_COLUMNS} FROM test_executions WHERE test_case_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, TestExecution>(&query)
            .bind(test_case_id)
            .fetch_all(pool)
            .await
    }

    /// Delete the execution at zero-based `position` in list order.
    ///
    /// Returns the removed row, or `None` if the position is past the end.
    pub async fn remove_execution_at(
        pool: &PgPool,
        test_case_id: DbId,
        position: i64,
    ) -> Result<Option<TestExecution>, sqlx::Error> {
        let query = format!(
            "DELETE FROM test_executions WHERE id = ( \
                 SELECT id FROM test_executions WHERE test_case_id = $1 \
                 ORDER BY id OFFSET $2 LIMIT 1 FOR UPDATE \
             ) RETURNING {EXECUTION_COLUMNS}"
        );
        sqlx::query_as::<_, TestExecution>(&query)
            .bind(test_case_id)
            .bind(position)
            .fetch_optional(pool)
            .await
    }

    /// Every execution recorded against any of `test_case_ids`.
    pub async fn executions_for_test_cases(
        pool: &PgPool,
        test_case_ids: &[DbId],
    ) -> Result<Vec<TestExecution>, sqlx::Error> {
        if test_case_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {EXECUTION_COLUMNS} FROM test_executions \
             WHERE test_case_id = ANY($1) ORDER BY test_case_id, id"
        );
        sqlx::query_as::<_, TestExecution>(&query)
            .bind(test_case_ids)
            .fetch_all(pool)
            .await
    }
}
