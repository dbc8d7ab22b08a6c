//! Performance metric snapshot models.
//!
//! `performance_metrics_latest` holds one row per team, replaced on every
//! aggregation pass. `performance_metrics_history` keeps one row per team
//! per UTC day for trend charts.

use chrono::NaiveDate;
use qalab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `performance_metrics_latest` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LatestPerformanceMetrics {
    pub team_id: DbId,
    pub bugs_logged: i64,
    pub bugs_resolved_count: i64,
    pub avg_resolution_time_hours: f64,
    pub test_cases_executed: i64,
    pub test_pass_rate: f64,
    pub test_coverage: f64,
    pub defect_density: f64,
    pub recorded_at: Timestamp,
}

/// A row from the `performance_metrics_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PerformanceMetricsHistoryEntry {
    pub id: DbId,
    pub team_id: DbId,
    pub recorded_on: NaiveDate,
    pub bugs_logged: i64,
    pub bugs_resolved_count: i64,
    pub avg_resolution_time_hours: f64,
    pub test_cases_executed: i64,
    pub test_pass_rate: f64,
    pub test_coverage: f64,
    pub defect_density: f64,
    pub recorded_at: Timestamp,
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct MetricsHistoryParams {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
}
