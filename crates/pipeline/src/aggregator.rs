//! The report aggregator.
//!
//! One run processes every team in order:
//!
//! 1. resolve the roster (members, assigned test cases)
//! 2. collect bug and execution metrics
//! 3. derive coverage, pass rate and defect density
//! 4. upsert the performance snapshot
//! 5. upsert the QA report keyed by team name
//!
//! Reports are keyed by team name, so when two teams share a name only the
//! first one listed is aggregated and the rest are counted as failed.
//! Once every team has been visited, reports for team names that were not
//! seen are deleted. Runs are serialized: a scheduled pass and a
//! request-triggered pass never interleave.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use qalab_core::qa_metrics::{
    collect_bug_metrics, collect_execution_metrics, compute_team_metrics, PerformanceSnapshot,
    QaReportDraft, ReportPeriod,
};
use qalab_core::types::Timestamp;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::PipelineError;
use crate::store::{QaStore, StoreError, TeamRecord};

/// Summary of one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationOutcome {
    pub teams_processed: usize,
    /// Names of teams skipped because their data could not be read or
    /// written. Their previous reports are kept.
    pub teams_failed: Vec<String>,
    pub reports_removed: u64,
    pub generated_at: Timestamp,
}

pub struct Aggregator {
    store: Arc<dyn QaStore>,
    run_lock: Mutex<()>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn QaStore>) -> Self {
        Self {
            store,
            run_lock: Mutex::new(()),
        }
    }

    /// `true` while a run holds the run lock.
    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Run one full aggregation pass over every team.
    ///
    /// Fails only when the team list itself cannot be read or the final
    /// reconcile fails; a single team's fault is logged and that team is
    /// skipped.
    pub async fn run(&self) -> Result<AggregationOutcome, PipelineError> {
        let _guard = self.run_lock.lock().await;
        let started = Instant::now();
        let now = Utc::now();

        let teams = self.store.list_teams().await?;
        let mut present: Vec<String> = Vec::with_capacity(teams.len());
        let mut teams_processed = 0;
        let mut teams_failed = Vec::new();
        let mut claimed: HashSet<&str> = HashSet::with_capacity(teams.len());

        for team in &teams {
            if claimed.contains(team.name.as_str()) {
                teams_failed.push(team.name.clone());
                tracing::warn!(
                    team_id = team.id,
                    team_name = %team.name,
                    "Team name already reported by another team, skipping",
                );
                continue;
            }

            match self.aggregate_team(team, now).await {
                Ok(report) => {
                    teams_processed += 1;
                    claimed.insert(&team.name);
                    present.push(team.name.clone());
                    tracing::info!(
                        team_id = team.id,
                        team_name = %team.name,
                        tests_executed = report.tests_executed,
                        test_coverage = report.test_coverage,
                        pass_rate = report.pass_rate,
                        "Aggregated team QA metrics",
                    );
                }
                Err(StoreError::NotFound { .. }) => {
                    tracing::info!(
                        team_id = team.id,
                        team_name = %team.name,
                        "Team disappeared during aggregation, skipping",
                    );
                }
                Err(e) => {
                    // The team still exists, so its last good report stays.
                    claimed.insert(&team.name);
                    present.push(team.name.clone());
                    teams_failed.push(team.name.clone());
                    tracing::warn!(
                        team_id = team.id,
                        team_name = %team.name,
                        error = %e,
                        "Failed to aggregate team, skipping",
                    );
                }
            }
        }

        let reports_removed = self.store.delete_reports_except(&present).await?;

        tracing::info!(
            teams_processed,
            teams_failed = teams_failed.len(),
            reports_removed,
            duration_ms = started.elapsed().as_millis() as u64,
            "Aggregation run complete",
        );

        Ok(AggregationOutcome {
            teams_processed,
            teams_failed,
            reports_removed,
            generated_at: now,
        })
    }

    async fn aggregate_team(&self, team: &TeamRecord, now: Timestamp) -> Result<QaReportDraft, StoreError> {
        let roster = self.store.resolve_roster(team.id).await?;
        let bugs = self.store.bugs_for_team(team.id).await?;
        let executions = self.store.executions_for_test_cases(&roster.test_case_ids).await?;

        tracing::debug!(
            team_id = team.id,
            members = roster.member_ids.len(),
            test_cases = roster.test_case_ids.len(),
            bugs = bugs.len(),
            executions = executions.len(),
            "Collected team QA data",
        );

        let bug_metrics = collect_bug_metrics(&bugs);
        let execution_metrics = collect_execution_metrics(team.id, &executions);
        let metrics = compute_team_metrics(
            roster.test_case_ids.len() as i64,
            &bug_metrics,
            &execution_metrics,
        );

        let snapshot = PerformanceSnapshot::from_metrics(team.id, &metrics, now);
        self.store.upsert_snapshot(&snapshot).await?;

        let period = ReportPeriod::resolve(team.period_start, team.period_end, now);
        let report = QaReportDraft::build(&team.name, period, &metrics, now);
        self.store.upsert_report(&report).await?;

        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
