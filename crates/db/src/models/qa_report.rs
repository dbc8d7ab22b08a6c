//! QA report entity model.

use qalab_core::dashboard::ReportSample;
use qalab_core::qa_metrics::QaReportDraft;
use qalab_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `qa_reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QaReport {
    pub id: DbId,
    pub team_name: String,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub tests_designed: i64,
    pub tests_executed: i64,
    pub test_coverage: f64,
    pub pass_count: i64,
    pub fail_count: i64,
    pub pass_rate: f64,
    pub new_defects: i64,
    pub defects_closed: i64,
    pub defect_density: f64,
    pub severity_critical: i64,
    pub severity_high: i64,
    pub severity_medium: i64,
    pub severity_low: i64,
    pub generated_at: Timestamp,
}

impl QaReport {
    /// The row without its surrogate id, as rendered by exports.
    pub fn to_draft(&self) -> QaReportDraft {
        QaReportDraft {
            team_name: self.team_name.clone(),
            period_start: self.period_start,
            period_end: self.period_end,
            tests_designed: self.tests_designed,
            tests_executed: self.tests_executed,
            test_coverage: self.test_coverage,
            pass_count: self.pass_count,
            fail_count: self.fail_count,
            pass_rate: self.pass_rate,
            new_defects: self.new_defects,
            defects_closed: self.defects_closed,
            defect_density: self.defect_density,
            severity_critical: self.severity_critical,
            severity_high: self.severity_high,
            severity_medium: self.severity_medium,
            severity_low: self.severity_low,
            generated_at: self.generated_at,
        }
    }
}

impl From<QaReport> for ReportSample {
    fn from(r: QaReport) -> Self {
        ReportSample {
            team_name: r.team_name,
            tests_designed: r.tests_designed,
            tests_executed: r.tests_executed,
            test_coverage: r.test_coverage,
            pass_rate: r.pass_rate,
            new_defects: r.new_defects,
            defects_closed: r.defects_closed,
            severity_critical: r.severity_critical,
            severity_high: r.severity_high,
            generated_at: r.generated_at,
        }
    }
}
