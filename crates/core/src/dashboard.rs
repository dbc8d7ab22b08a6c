//! Dashboard summary folding and threshold alerts.
//!
//! Dashboards read at most the two most recent QA report rows per team and
//! fold them into a summary. Pass rate is weighted by executed tests; when
//! no tests were executed at all the fold falls back to the unweighted mean
//! of test coverage.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::qa_metrics::round2;
use crate::types::Timestamp;

/// Number of recent reports per team considered by a dashboard.
pub const REPORTS_PER_TEAM: usize = 2;

/// Maximum number of entries in the instructor's recent-activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The QA report fields a dashboard fold reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSample {
    pub team_name: String,
    pub tests_designed: i64,
    pub tests_executed: i64,
    pub test_coverage: f64,
    pub pass_rate: f64,
    pub new_defects: i64,
    pub defects_closed: i64,
    pub severity_critical: i64,
    pub severity_high: i64,
    pub generated_at: Timestamp,
}

/// Group report rows by team name, newest first, keeping at most
/// [`REPORTS_PER_TEAM`] per team.
pub fn latest_reports_per_team(
    reports: impl IntoIterator<Item = ReportSample>,
) -> BTreeMap<String, Vec<ReportSample>> {
    let mut grouped: BTreeMap<String, Vec<ReportSample>> = BTreeMap::new();
    for report in reports {
        grouped.entry(report.team_name.clone()).or_default().push(report);
    }
    for rows in grouped.values_mut() {
        rows.sort_by(|a, b| b.generated_at.cmp(&a.generated_at));
        rows.truncate(REPORTS_PER_TEAM);
    }
    grouped
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Accumulator {
    tests_designed: i64,
    tests_executed: i64,
    open_defects: i64,
    closed_defects: i64,
    pass_rate_weighted_sum: f64,
    pass_rate_weight: i64,
    coverage_sum: f64,
    severity_critical: i64,
    severity_high: i64,
    count: usize,
}

impl Accumulator {
    fn fold<'a>(reports: impl IntoIterator<Item = &'a ReportSample>) -> Self {
        reports.into_iter().fold(Self::default(), |mut acc, r| {
            acc.tests_designed += r.tests_designed;
            acc.tests_executed += r.tests_executed;
            acc.open_defects += r.new_defects;
            acc.closed_defects += r.defects_closed;
            acc.pass_rate_weighted_sum += r.pass_rate * r.tests_executed as f64;
            acc.pass_rate_weight += r.tests_executed;
            acc.coverage_sum += r.test_coverage;
            acc.severity_critical += r.severity_critical;
            acc.severity_high += r.severity_high;
            acc.count += 1;
            acc
        })
    }

    fn mean_coverage(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.coverage_sum / self.count as f64
        }
    }

    fn pass_rate(&self) -> f64 {
        if self.pass_rate_weight > 0 {
            self.pass_rate_weighted_sum / self.pass_rate_weight as f64
        } else {
            self.mean_coverage()
        }
    }
}

/// Folded view of one team's recent reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub team_name: String,
    pub reports_count: usize,
    pub tests_designed: i64,
    pub tests_executed: i64,
    pub open_defects: i64,
    pub closed_defects: i64,
    pub pass_rate: f64,
    pub avg_test_coverage: f64,
    pub severity_critical: i64,
    pub severity_high: i64,
}

/// Fold a team's (at most two) recent reports.
pub fn summarize_team(team_name: &str, reports: &[ReportSample]) -> TeamSummary {
    let acc = Accumulator::fold(reports);
    TeamSummary {
        team_name: team_name.to_string(),
        reports_count: acc.count,
        tests_designed: acc.tests_designed,
        tests_executed: acc.tests_executed,
        open_defects: acc.open_defects,
        closed_defects: acc.closed_defects,
        pass_rate: round2(acc.pass_rate()),
        avg_test_coverage: round2(acc.mean_coverage()),
        severity_critical: acc.severity_critical,
        severity_high: acc.severity_high,
    }
}

/// Roll-up across every team's recent reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallQaMetrics {
    pub reports_considered: usize,
    pub tests_designed: i64,
    pub tests_executed: i64,
    pub pass_rate: f64,
    pub test_coverage: f64,
    pub open_defects: i64,
    pub closed_defects: i64,
}

/// Fold every considered report into one instructor-level summary.
pub fn summarize_overall<'a>(reports: impl IntoIterator<Item = &'a ReportSample>) -> OverallQaMetrics {
    let acc = Accumulator::fold(reports);
    OverallQaMetrics {
        reports_considered: acc.count,
        tests_designed: acc.tests_designed,
        tests_executed: acc.tests_executed,
        pass_rate: round2(acc.pass_rate()),
        test_coverage: round2(acc.mean_coverage()),
        open_defects: acc.open_defects,
        closed_defects: acc.closed_defects,
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Default alert thresholds.
pub const DEFAULT_MIN_PASS_RATE: f64 = 50.0;
pub const DEFAULT_MAX_OPEN_DEFECTS: i64 = 5;
pub const DEFAULT_MIN_COVERAGE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertKind {
    LowPassRate,
    HighDefects,
    LowCoverage,
    CriticalSeverity,
    HighSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    pub value: f64,
}

/// Thresholds for [`evaluate_alerts`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Alert when the folded pass rate is strictly below this.
    pub min_pass_rate: f64,
    /// Alert when open defects are strictly above this.
    pub max_open_defects: i64,
    /// Alert when average coverage is strictly below this.
    pub min_coverage: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            min_pass_rate: DEFAULT_MIN_PASS_RATE,
            max_open_defects: DEFAULT_MAX_OPEN_DEFECTS,
            min_coverage: DEFAULT_MIN_COVERAGE,
        }
    }
}

/// Evaluate the threshold rules against one team's summary.
///
/// `team` is attached to each alert for instructor views and left off for a
/// single-team dashboard.
pub fn evaluate_alerts(
    summary: &TeamSummary,
    thresholds: &AlertThresholds,
    team: Option<&str>,
) -> Vec<Alert> {
    let alert = |kind, value| Alert {
        kind,
        team: team.map(str::to_string),
        value,
    };

    let mut alerts = Vec::new();
    if summary.pass_rate < thresholds.min_pass_rate {
        alerts.push(alert(AlertKind::LowPassRate, summary.pass_rate));
    }
    if summary.open_defects > thresholds.max_open_defects {
        alerts.push(alert(AlertKind::HighDefects, summary.open_defects as f64));
    }
    if summary.avg_test_coverage < thresholds.min_coverage {
        alerts.push(alert(AlertKind::LowCoverage, summary.avg_test_coverage));
    }
    if summary.severity_critical > 0 {
        alerts.push(alert(AlertKind::CriticalSeverity, summary.severity_critical as f64));
    }
    if summary.severity_high > 0 {
        alerts.push(alert(AlertKind::HighSeverity, summary.severity_high as f64));
    }
    alerts
}

// ---------------------------------------------------------------------------
// Recent activity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Bug,
    Experiment,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub team: String,
    pub created_at: Timestamp,
}

/// Merge activity feeds newest first, keeping [`RECENT_ACTIVITY_LIMIT`].
pub fn merge_recent_activity(
    feeds: impl IntoIterator<Item = RecentActivity>,
) -> Vec<RecentActivity> {
    let mut merged: Vec<RecentActivity> = feeds.into_iter().collect();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged.truncate(RECENT_ACTIVITY_LIMIT);
    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
