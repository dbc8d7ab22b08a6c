//! Repository for the `qa_reports` table.
//!
//! Rows are keyed by team name. The aggregator upserts one row per team and
//! then deletes every row whose name it did not see.

use qalab_core::qa_metrics::QaReportDraft;
use sqlx::PgPool;

use crate::models::qa_report::QaReport;

/// Column list for `qa_reports` queries.
const COLUMNS: &str = "\
    id, team_name, period_start, period_end, tests_designed, tests_executed, \
    test_coverage, pass_count, fail_count, pass_rate, new_defects, defects_closed, \
    defect_density, severity_critical, severity_high, severity_medium, severity_low, \
    generated_at";

pub struct QaReportRepo;

impl QaReportRepo {
    /// Insert or overwrite the report for `draft.team_name`.
    pub async fn upsert(pool: &PgPool, draft: &QaReportDraft) -> Result<QaReport, sqlx::Error> {
        let query = format!(
            "INSERT INTO qa_reports \
                (team_name, period_start, period_end, tests_designed, tests_executed, \
                 test_coverage, pass_count, fail_count, pass_rate, new_defects, defects_closed, \
                 defect_density, severity_critical, severity_high, severity_medium, severity_low, \
                 generated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             ON CONFLICT ON CONSTRAINT uq_qa_reports_team_name DO UPDATE SET \
                period_start = EXCLUDED.period_start, \
                period_end = EXCLUDED.period_end, \
                tests_designed = EXCLUDED.tests_designed, \
                tests_executed = EXCLUDED.tests_executed, \
                test_coverage = EXCLUDED.test_coverage, \
                pass_count = EXCLUDED.pass_count, \
                fail_count = EXCLUDED.fail_count, \
                pass_rate = EXCLUDED.pass_rate, \
                new_defects = EXCLUDED.new_defects, \
                defects_closed = EXCLUDED.defects_closed, \
                defect_density = EXCLUDED.defect_density, \
                severity_critical = EXCLUDED.severity_critical, \
                severity_high = EXCLUDED.severity_high, \
                severity_medium = EXCLUDED.severity_medium, \
                severity_low = EXCLUDED.severity_low, \
                generated_at = EXCLUDED.generated_at \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QaReport>(&query)
            .bind(&draft.team_name)
            .bind(draft.period_start)
            .bind(draft.period_end)
            .bind(draft.tests_designed)
            .bind(draft.tests_executed)
            .bind(draft.test_coverage)
            .bind(draft.pass_count)
            .bind(draft.fail_count)
            .bind(draft.pass_rate)
            .bind(draft.new_defects)
            .bind(draft.defects_closed)
            .bind(draft.defect_density)
            .bind(draft.severity_critical)
            .bind(draft.severity_high)
            .bind(draft.severity_medium)
            .bind(draft.severity_low)
            .bind(draft.generated_at)
            .fetch_one(pool)
            .await
    }

    /// Delete every report whose team name is not in `keep`. Returns the
    /// number of rows removed.
    pub async fn delete_except(pool: &PgPool, keep: &[String]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM qa_reports WHERE NOT (team_name = ANY($1))")
            .bind(keep)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// All current reports ordered by team name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<QaReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qa_reports ORDER BY team_name");
        sqlx::query_as::<_, QaReport>(&query).fetch_all(pool).await
    }

    /// Up to `per_team` newest reports for every team name.
    pub async fn latest_per_team(pool: &PgPool, per_team: i64) -> Result<Vec<QaReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ( \
                 SELECT *, ROW_NUMBER() OVER ( \
                     PARTITION BY team_name ORDER BY generated_at DESC, id DESC \
                 ) AS rn \
                 FROM qa_reports \
             ) ranked \
             WHERE rn <= $1 \
             ORDER BY team_name, generated_at DESC"
        );
        sqlx::query_as::<_, QaReport>(&query)
            .bind(per_team)
            .fetch_all(pool)
            .await
    }

    /// Up to `limit` newest reports for one team name.
    pub async fn latest_for_team(
        pool: &PgPool,
        team_name: &str,
        limit: i64,
    ) -> Result<Vec<QaReport>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM qa_reports WHERE team_name = $1 \
             ORDER BY generated_at DESC, id DESC LIMIT $2"
        );
        sqlx::query_as::<_, QaReport>(&query)
            .bind(team_name)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_team_name(pool: &PgPool, team_name: &str) -> Result<Option<QaReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM qa_reports WHERE team_name = $1");
        sqlx::query_as::<_, QaReport>(&query)
            .bind(team_name)
            .fetch_optional(pool)
            .await
    }
}
