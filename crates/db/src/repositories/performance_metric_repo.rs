//! Repository for the performance metric snapshot tables.

use qalab_core::qa_metrics::PerformanceSnapshot;
use qalab_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::performance_metric::{LatestPerformanceMetrics, PerformanceMetricsHistoryEntry};

/// Column list shared by both snapshot tables (minus keys).
const METRIC_COLUMNS: &str = "\
    bugs_logged, bugs_resolved_count, avg_resolution_time_hours, \
    test_cases_executed, test_pass_rate, test_coverage, defect_density, recorded_at";

pub struct PerformanceMetricRepo;

impl PerformanceMetricRepo {
    /// Replace the team's "latest" row, inserting it on first run.
    pub async fn upsert_latest(
        pool: &PgPool,
        snapshot: &PerformanceSnapshot,
    ) -> Result<LatestPerformanceMetrics, sqlx::Error> {
        let query = format!(
            "INSERT INTO performance_metrics_latest (team_id, {METRIC_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (team_id) DO UPDATE SET \
                bugs_logged = EXCLUDED.bugs_logged, \
                bugs_resolved_count = EXCLUDED.bugs_resolved_count, \
                avg_resolution_time_hours = EXCLUDED.avg_resolution_time_hours, \
                test_cases_executed = EXCLUDED.test_cases_executed, \
                test_pass_rate = EXCLUDED.test_pass_rate, \
                test_coverage = EXCLUDED.test_coverage, \
                defect_density = EXCLUDED.defect_density, \
                recorded_at = EXCLUDED.recorded_at \
             RETURNING team_id, {METRIC_COLUMNS}"
        );
        sqlx::query_as::<_, LatestPerformanceMetrics>(&query)
            .bind(snapshot.team_id)
            .bind(snapshot.bugs_logged)
            .bind(snapshot.bugs_resolved_count)
            .bind(snapshot.avg_resolution_time_hours)
            .bind(snapshot.test_cases_executed)
            .bind(snapshot.test_pass_rate)
            .bind(snapshot.test_coverage)
            .bind(snapshot.defect_density)
            .bind(snapshot.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// Upsert the history row for the UTC day of `snapshot.recorded_at`.
    pub async fn upsert_history_for_day(
        pool: &PgPool,
        snapshot: &PerformanceSnapshot,
    ) -> Result<PerformanceMetricsHistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO performance_metrics_history (team_id, recorded_on, {METRIC_COLUMNS}) \
             VALUES ($1, ($9 AT TIME ZONE 'UTC')::date, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT ON CONSTRAINT uq_performance_metrics_history_team_day DO UPDATE SET \
                bugs_logged = EXCLUDED.bugs_logged, \
                bugs_resolved_count = EXCLUDED.bugs_resolved_count, \
                avg_resolution_time_hours = EXCLUDED.avg_resolution_time_hours, \
                test_cases_executed = EXCLUDED.test_cases_executed, \
                test_pass_rate = EXCLUDED.test_pass_rate, \
                test_coverage = EXCLUDED.test_coverage, \
                defect_density = EXCLUDED.defect_density, \
                recorded_at = EXCLUDED.recorded_at \
             RETURNING id, team_id, recorded_on, {METRIC_COLUMNS}"
        );
        sqlx::query_as::<_, PerformanceMetricsHistoryEntry>(&query)
            .bind(snapshot.team_id)
            .bind(snapshot.bugs_logged)
            .bind(snapshot.bugs_resolved_count)
            .bind(snapshot.avg_resolution_time_hours)
            .bind(snapshot.test_cases_executed)
            .bind(snapshot.test_pass_rate)
            .bind(snapshot.test_coverage)
            .bind(snapshot.defect_density)
            .bind(snapshot.recorded_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_latest(
        pool: &PgPool,
        team_id: DbId,
    ) -> Result<Option<LatestPerformanceMetrics>, sqlx::Error> {
        let query = format!(
            "SELECT team_id, {METRIC_COLUMNS} FROM performance_metrics_latest WHERE team_id = $1"
        );
        sqlx::query_as::<_, LatestPerformanceMetrics>(&query)
            .bind(team_id)
            .fetch_optional(pool)
            .await
    }

    /// Trend history for a team, newest first, optionally bounded in time.
    pub async fn history(
        pool: &PgPool,
        team_id: DbId,
        from: Option<Timestamp>,
        to: Option<Timestamp>,
        limit: i64,
    ) -> Result<Vec<PerformanceMetricsHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT id, team_id, recorded_on, {METRIC_COLUMNS} \
             FROM performance_metrics_history \
             WHERE team_id = $1 \
               AND ($2::timestamptz IS NULL OR recorded_at >= $2) \
               AND ($3::timestamptz IS NULL OR recorded_at <= $3) \
             ORDER BY recorded_at DESC \
             LIMIT $4"
        );
        sqlx::query_as::<_, PerformanceMetricsHistoryEntry>(&query)
            .bind(team_id)
            .bind(from)
            .bind(to)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
