//! CSV rendering of current QA reports.
//!
//! Column order is fixed so spreadsheets built on the export keep working
//! across releases.

use serde::Serialize;

use crate::error::CoreError;
use crate::qa_metrics::QaReportDraft;

/// Header row of the export, in output order.
pub const REPORT_CSV_COLUMNS: &[&str] = &[
    "teamName",
    "periodStart",
    "periodEnd",
    "testsDesigned",
    "testsExecuted",
    "testCoverage",
    "passCount",
    "failCount",
    "passRate",
    "newDefects",
    "defectsClosed",
    "defectDensity",
    "severityCritical",
    "severityHigh",
    "severityMedium",
    "severityLow",
];

/// Suggested download name for the export.
pub const REPORT_CSV_FILENAME: &str = "general_report.csv";

/// One flattened export row. Field order matches [`REPORT_CSV_COLUMNS`].
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    team_name: &'a str,
    period_start: String,
    period_end: String,
    tests_designed: i64,
    tests_executed: i64,
    test_coverage: f64,
    pass_count: i64,
    fail_count: i64,
    pass_rate: f64,
    new_defects: i64,
    defects_closed: i64,
    defect_density: String,
    severity_critical: i64,
    severity_high: i64,
    severity_medium: i64,
    severity_low: i64,
}

impl<'a> From<&'a QaReportDraft> for CsvRow<'a> {
    fn from(r: &'a QaReportDraft) -> Self {
        Self {
            team_name: &r.team_name,
            period_start: r.period_start.format("%Y-%m-%d").to_string(),
            period_end: r.period_end.format("%Y-%m-%d").to_string(),
            tests_designed: r.tests_designed,
            tests_executed: r.tests_executed,
            test_coverage: r.test_coverage,
            pass_count: r.pass_count,
            fail_count: r.fail_count,
            pass_rate: r.pass_rate,
            new_defects: r.new_defects,
            defects_closed: r.defects_closed,
            defect_density: format!("{:.2}", r.defect_density),
            severity_critical: r.severity_critical,
            severity_high: r.severity_high,
            severity_medium: r.severity_medium,
            severity_low: r.severity_low,
        }
    }
}

/// Render reports as CSV text with a header row.
pub fn render_reports_csv<'a>(
    reports: impl IntoIterator<Item = &'a QaReportDraft>,
) -> Result<String, CoreError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(REPORT_CSV_COLUMNS)
        .map_err(|e| CoreError::Internal(format!("CSV header write failed: {e}")))?;
    for report in reports {
        writer
            .serialize(CsvRow::from(report))
            .map_err(|e| CoreError::Internal(format!("CSV row write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Internal(format!("CSV is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn draft(team: &str) -> QaReportDraft {
        QaReportDraft {
            team_name: team.to_string(),
            period_start: Utc.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap(),
            period_end: Utc.with_ymd_and_hms(2025, 3, 28, 12, 0, 0).unwrap(),
            tests_designed: 2,
            tests_executed: 3,
            test_coverage: 100.0,
            pass_count: 2,
            fail_count: 1,
            pass_rate: 66.67,
            new_defects: 4,
            defects_closed: 3,
            defect_density: 4000.0 / 3.0,
            severity_critical: 1,
            severity_high: 0,
            severity_medium: 3,
            severity_low: 0,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn header_only_when_no_reports() {
        let csv = render_reports_csv(&Vec::<QaReportDraft>::new()).unwrap();
        assert_eq!(csv.trim_end(), REPORT_CSV_COLUMNS.join(","));
    }

    #[test]
    fn row_follows_column_order() {
        let reports = vec![draft("Alpha")];
        let csv = render_reports_csv(&reports).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Alpha,2025-01-06,2025-03-28,2,3,100.0,2,1,66.67,4,3,1333.33,1,0,3,0"
        );
    }

    #[test]
    fn team_names_with_commas_are_quoted() {
        let reports = vec![draft("Red, Team")];
        let csv = render_reports_csv(&reports).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("\"Red, Team\","));
    }
}
