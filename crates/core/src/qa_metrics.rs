//! QA metric collectors and formulas.
//!
//! Turns raw per-team bug and execution records into the derived metrics
//! stored on QA reports and performance snapshots. Two representations of
//! pass rate coexist here: [`ExecutionMetrics::test_pass_rate`] is a
//! fraction in `[0, 1]`, while [`TeamQaMetrics::pass_rate`] is a percentage
//! in `[0, 100]` rounded to two decimals.

use std::collections::BTreeMap;

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::bug_status::{
    is_resolved, SEVERITY_CRITICAL, SEVERITY_HIGH, SEVERITY_LOW, SEVERITY_MEDIUM,
};
use crate::test_execution::{EXEC_FAIL, EXEC_PASS};
use crate::types::{DbId, Timestamp};

/// Defect density is expressed per this many executed tests.
pub const DEFECT_DENSITY_SCALE: f64 = 1000.0;

/// Coverage never reports above this value, even when re-runs push the
/// executed count past the designed count.
pub const MAX_COVERAGE_PERCENT: f64 = 100.0;

// ---------------------------------------------------------------------------
// Input samples
// ---------------------------------------------------------------------------

/// The slice of a bug record the collectors read.
#[derive(Debug, Clone, PartialEq)]
pub struct BugSample {
    pub severity: Option<String>,
    pub current_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The slice of an embedded test execution the collectors read.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSample {
    pub team_id: DbId,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Bug metrics
// ---------------------------------------------------------------------------

/// Tally of bugs per severity. Unknown severities are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCount {
    pub critical: i64,
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

impl SeverityCount {
    fn record(&mut self, severity: &str) {
        match severity {
            SEVERITY_CRITICAL => self.critical += 1,
            SEVERITY_HIGH => self.high += 1,
            SEVERITY_MEDIUM => self.medium += 1,
            SEVERITY_LOW => self.low += 1,
            _ => {}
        }
    }
}

/// Per-team bug counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BugMetrics {
    pub bugs_logged: i64,
    pub bugs_resolved_count: i64,
    pub severity: SeverityCount,
    /// Mean of `updated_at - created_at` in hours over resolved bugs; 0 when
    /// none are resolved.
    pub avg_resolution_time_hours: f64,
}

/// Count a team's bugs by status and severity.
pub fn collect_bug_metrics(bugs: &[BugSample]) -> BugMetrics {
    let mut metrics = BugMetrics {
        bugs_logged: bugs.len() as i64,
        ..BugMetrics::default()
    };
    let mut resolution_hours_total = 0.0;

    for bug in bugs {
        if let Some(severity) = bug.severity.as_deref() {
            metrics.severity.record(severity);
        }
        if is_resolved(&bug.current_status) {
            metrics.bugs_resolved_count += 1;
            let elapsed = bug.updated_at - bug.created_at;
            resolution_hours_total += elapsed.num_milliseconds() as f64 / 3_600_000.0;
        }
    }

    if metrics.bugs_resolved_count > 0 {
        metrics.avg_resolution_time_hours =
            resolution_hours_total / metrics.bugs_resolved_count as f64;
    }
    metrics
}

// ---------------------------------------------------------------------------
// Execution metrics
// ---------------------------------------------------------------------------

/// Per-team execution counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionMetrics {
    pub pass_count: i64,
    pub fail_count: i64,
    /// `pass_count + fail_count`; blocked and not-run executions are excluded.
    pub tests_executed: i64,
    /// Raw count per status, including blocked and not-run.
    pub by_status: BTreeMap<String, i64>,
}

impl ExecutionMetrics {
    /// Pass rate as a fraction in `[0, 1]`.
    pub fn test_pass_rate(&self) -> f64 {
        if self.tests_executed > 0 {
            self.pass_count as f64 / self.tests_executed as f64
        } else {
            0.0
        }
    }
}

/// Group the executions that belong to `team_id` by status.
///
/// Executions recorded by other teams on a shared test case are ignored.
pub fn collect_execution_metrics(team_id: DbId, executions: &[ExecutionSample]) -> ExecutionMetrics {
    let mut by_status: BTreeMap<String, i64> = BTreeMap::new();
    for exec in executions.iter().filter(|e| e.team_id == team_id) {
        *by_status.entry(exec.status.clone()).or_insert(0) += 1;
    }

    let pass_count = by_status.get(EXEC_PASS).copied().unwrap_or(0);
    let fail_count = by_status.get(EXEC_FAIL).copied().unwrap_or(0);

    ExecutionMetrics {
        pass_count,
        fail_count,
        tests_executed: pass_count + fail_count,
        by_status,
    }
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Executed-over-designed percentage, clamped to 100 and rounded.
pub fn test_coverage(tests_designed: i64, tests_executed: i64) -> f64 {
    if tests_designed <= 0 {
        return 0.0;
    }
    let raw = tests_executed as f64 / tests_designed as f64 * 100.0;
    round2(raw.min(MAX_COVERAGE_PERCENT))
}

/// Pass percentage over executed tests, rounded.
pub fn pass_rate_percent(pass_count: i64, tests_executed: i64) -> f64 {
    if tests_executed <= 0 {
        return 0.0;
    }
    round2(pass_count as f64 / tests_executed as f64 * 100.0)
}

/// Defects per 1000 executed tests. Zero when nothing was executed.
pub fn defect_density(defects: i64, tests_executed: i64) -> f64 {
    if tests_executed <= 0 {
        return 0.0;
    }
    defects as f64 / tests_executed as f64 * DEFECT_DENSITY_SCALE
}

// ---------------------------------------------------------------------------
// Combined team metrics
// ---------------------------------------------------------------------------

/// Everything the aggregator derives for one team in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamQaMetrics {
    pub tests_designed: i64,
    pub tests_executed: i64,
    pub test_coverage: f64,
    pub pass_count: i64,
    pub fail_count: i64,
    pub pass_rate: f64,
    pub test_pass_rate: f64,
    pub new_defects: i64,
    pub defects_closed: i64,
    pub defect_density: f64,
    pub avg_resolution_time_hours: f64,
    pub severity: SeverityCount,
}

/// Combine the collector outputs with the designed test-case count.
pub fn compute_team_metrics(
    tests_designed: i64,
    bugs: &BugMetrics,
    executions: &ExecutionMetrics,
) -> TeamQaMetrics {
    let tests_executed = executions.tests_executed;
    TeamQaMetrics {
        tests_designed,
        tests_executed,
        test_coverage: test_coverage(tests_designed, tests_executed),
        pass_count: executions.pass_count,
        fail_count: executions.fail_count,
        pass_rate: pass_rate_percent(executions.pass_count, tests_executed),
        test_pass_rate: executions.test_pass_rate(),
        new_defects: bugs.bugs_logged,
        defects_closed: bugs.bugs_resolved_count,
        defect_density: defect_density(bugs.bugs_logged, tests_executed),
        avg_resolution_time_hours: bugs.avg_resolution_time_hours,
        severity: bugs.severity,
    }
}

// ---------------------------------------------------------------------------
// Snapshot and report drafts
// ---------------------------------------------------------------------------

/// A team's rolling "latest" performance snapshot, ready to upsert.
///
/// Construct through [`PerformanceSnapshot::from_metrics`] so that
/// `defect_density` always agrees with `bugs_logged / test_cases_executed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSnapshot {
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

impl PerformanceSnapshot {
    pub fn from_metrics(team_id: DbId, metrics: &TeamQaMetrics, recorded_at: Timestamp) -> Self {
        Self {
            team_id,
            bugs_logged: metrics.new_defects,
            bugs_resolved_count: metrics.defects_closed,
            avg_resolution_time_hours: metrics.avg_resolution_time_hours,
            test_cases_executed: metrics.tests_executed,
            test_pass_rate: metrics.test_pass_rate,
            test_coverage: metrics.test_coverage,
            defect_density: defect_density(metrics.new_defects, metrics.tests_executed),
            recorded_at,
        }
    }
}

/// The reporting window printed on a QA report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl ReportPeriod {
    /// Use the experiment's dates when known. A team without an experiment
    /// reports from 2000-01-01 up to `now`.
    pub fn resolve(start: Option<Timestamp>, end: Option<Timestamp>, now: Timestamp) -> Self {
        let fallback_start = chrono::Utc
            .with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        Self {
            start: start.unwrap_or(fallback_start),
            end: end.unwrap_or(now),
        }
    }
}

/// A fully regenerated QA report row, keyed by team name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaReportDraft {
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

impl QaReportDraft {
    pub fn build(
        team_name: &str,
        period: ReportPeriod,
        metrics: &TeamQaMetrics,
        generated_at: Timestamp,
    ) -> Self {
        Self {
            team_name: team_name.to_string(),
            period_start: period.start,
            period_end: period.end,
            tests_designed: metrics.tests_designed,
            tests_executed: metrics.tests_executed,
            test_coverage: metrics.test_coverage,
            pass_count: metrics.pass_count,
            fail_count: metrics.fail_count,
            pass_rate: metrics.pass_rate,
            new_defects: metrics.new_defects,
            defects_closed: metrics.defects_closed,
            defect_density: metrics.defect_density,
            severity_critical: metrics.severity.critical,
            severity_high: metrics.severity.high,
            severity_medium: metrics.severity.medium,
            severity_low: metrics.severity.low,
            generated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::bug_status::{STATUS_CLOSED, STATUS_IN_REVIEW, STATUS_OPEN, STATUS_RESOLVED};
    use crate::test_execution::{EXEC_BLOCKED, EXEC_NOT_RUN};

    fn bug(severity: Option<&str>, status: &str, hours_open: i64) -> BugSample {
        let created_at = Utc::now() - Duration::days(10);
        BugSample {
            severity: severity.map(str::to_string),
            current_status: status.to_string(),
            created_at,
            updated_at: created_at + Duration::hours(hours_open),
        }
    }

    fn exec(team_id: DbId, status: &str) -> ExecutionSample {
        ExecutionSample {
            team_id,
            status: status.to_string(),
        }
    }

    // -- bug collector -------------------------------------------------------

    #[test]
    fn bug_metrics_count_status_and_severity() {
        let bugs = vec![
            bug(Some("critical"), STATUS_OPEN, 1),
            bug(Some("medium"), STATUS_CLOSED, 4),
            bug(Some("medium"), STATUS_RESOLVED, 8),
            bug(Some("low"), STATUS_IN_REVIEW, 2),
        ];
        let m = collect_bug_metrics(&bugs);
        assert_eq!(m.bugs_logged, 4);
        assert_eq!(m.bugs_resolved_count, 2);
        assert_eq!(
            m.severity,
            SeverityCount {
                critical: 1,
                high: 0,
                medium: 2,
                low: 1
            }
        );
        assert!((m.avg_resolution_time_hours - 6.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_or_missing_severity_is_ignored() {
        let bugs = vec![bug(None, STATUS_OPEN, 0), bug(Some("blocker"), STATUS_OPEN, 0)];
        let m = collect_bug_metrics(&bugs);
        assert_eq!(m.bugs_logged, 2);
        assert_eq!(m.severity, SeverityCount::default());
    }

    #[test]
    fn no_resolved_bugs_means_zero_resolution_time() {
        let m = collect_bug_metrics(&[bug(Some("high"), STATUS_OPEN, 30)]);
        assert_eq!(m.avg_resolution_time_hours, 0.0);
        assert_eq!(collect_bug_metrics(&[]).avg_resolution_time_hours, 0.0);
    }

    // -- execution collector -------------------------------------------------

    #[test]
    fn executions_are_filtered_by_team() {
        let execs = vec![
            exec(1, EXEC_PASS),
            exec(1, EXEC_FAIL),
            exec(2, EXEC_PASS),
            exec(2, EXEC_PASS),
        ];
        let m = collect_execution_metrics(1, &execs);
        assert_eq!(m.pass_count, 1);
        assert_eq!(m.fail_count, 1);
        assert_eq!(m.tests_executed, 2);
    }

    #[test]
    fn blocked_and_not_run_do_not_inflate_executed() {
        let execs = vec![
            exec(1, EXEC_PASS),
            exec(1, EXEC_BLOCKED),
            exec(1, EXEC_NOT_RUN),
            exec(1, EXEC_NOT_RUN),
        ];
        let m = collect_execution_metrics(1, &execs);
        assert_eq!(m.tests_executed, 1);
        assert_eq!(m.by_status.get(EXEC_BLOCKED), Some(&1));
        assert_eq!(m.by_status.get(EXEC_NOT_RUN), Some(&2));
        assert_eq!(m.test_pass_rate(), 1.0);
    }

    #[test]
    fn pass_rate_fraction_is_zero_without_executions() {
        let m = collect_execution_metrics(1, &[exec(1, EXEC_BLOCKED)]);
        assert_eq!(m.test_pass_rate(), 0.0);
    }

    // -- formulas ------------------------------------------------------------

    #[test]
    fn coverage_is_clamped_to_100() {
        assert_eq!(test_coverage(5, 12), 100.0);
        assert_eq!(test_coverage(2, 3), 100.0);
        assert_eq!(test_coverage(3, 1), 33.33);
        assert_eq!(test_coverage(0, 4), 0.0);
    }

    #[test]
    fn defect_density_zero_guard() {
        let d = defect_density(3, 0);
        assert_eq!(d, 0.0);
        assert!(d.is_finite());
    }

    #[test]
    fn pass_rate_percent_rounds_to_two_decimals() {
        assert_eq!(pass_rate_percent(2, 3), 66.67);
        assert_eq!(pass_rate_percent(0, 0), 0.0);
        assert_eq!(pass_rate_percent(12, 12), 100.0);
    }

    #[test]
    fn end_to_end_team_example() {
        let bugs = vec![
            bug(Some("critical"), STATUS_OPEN, 1),
            bug(Some("medium"), STATUS_CLOSED, 2),
            bug(Some("medium"), STATUS_CLOSED, 2),
            bug(Some("medium"), STATUS_CLOSED, 2),
        ];
        let execs = vec![exec(7, EXEC_PASS), exec(7, EXEC_PASS), exec(7, EXEC_FAIL)];
        let m = compute_team_metrics(
            2,
            &collect_bug_metrics(&bugs),
            &collect_execution_metrics(7, &execs),
        );

        assert_eq!(m.new_defects, 4);
        assert_eq!(m.defects_closed, 3);
        assert_eq!(m.severity.critical, 1);
        assert_eq!(m.tests_executed, 3);
        assert_eq!(m.pass_count, 2);
        assert_eq!(m.pass_rate, 66.67);
        assert_eq!(m.test_coverage, 100.0);
        assert!((m.defect_density - 4000.0 / 3.0).abs() < 1e-9);
        assert_eq!(round2(m.defect_density), 1333.33);
    }

    #[test]
    fn snapshot_density_follows_counts() {
        let metrics = TeamQaMetrics {
            tests_designed: 4,
            tests_executed: 8,
            test_coverage: 100.0,
            pass_count: 6,
            fail_count: 2,
            pass_rate: 75.0,
            test_pass_rate: 0.75,
            new_defects: 2,
            defects_closed: 1,
            defect_density: 9999.0,
            avg_resolution_time_hours: 3.5,
            severity: SeverityCount::default(),
        };
        let snap = PerformanceSnapshot::from_metrics(9, &metrics, Utc::now());
        assert_eq!(snap.defect_density, 250.0);
        assert_eq!(snap.test_cases_executed, 8);
        assert_eq!(snap.test_pass_rate, 0.75);
    }

    #[test]
    fn period_falls_back_without_experiment() {
        let now = Utc::now();
        let period = ReportPeriod::resolve(None, None, now);
        assert_eq!(period.end, now);
        assert_eq!(period.start.to_rfc3339(), "2000-01-01T00:00:00+00:00");

        let start = now - Duration::days(30);
        let period = ReportPeriod::resolve(Some(start), Some(now), now);
        assert_eq!(period.start, start);
    }
}
