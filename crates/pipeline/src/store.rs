//! The storage seam the aggregator reads from and writes to.

use async_trait::async_trait;
use qalab_core::qa_metrics::{BugSample, ExecutionSample, PerformanceSnapshot, QaReportDraft};
use qalab_core::types::{DbId, Timestamp};

/// Errors raised by a [`QaStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A team as seen by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRecord {
    pub id: DbId,
    pub name: String,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
}

/// Who is on a team and which test cases it has been assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRoster {
    pub member_ids: Vec<DbId>,
    pub test_case_ids: Vec<DbId>,
}

#[async_trait]
pub trait QaStore: Send + Sync {
    /// Every team, in a stable order.
    async fn list_teams(&self) -> Result<Vec<TeamRecord>, StoreError>;

    /// Members and assigned test cases. Fails with [`StoreError::NotFound`]
    /// when the team no longer exists.
    async fn resolve_roster(&self, team_id: DbId) -> Result<TeamRoster, StoreError>;

    /// Bugs whose team field is `team_id`.
    async fn bugs_for_team(&self, team_id: DbId) -> Result<Vec<BugSample>, StoreError>;

    /// All executions recorded against the given test cases, for any team.
    async fn executions_for_test_cases(
        &self,
        test_case_ids: &[DbId],
    ) -> Result<Vec<ExecutionSample>, StoreError>;

    /// Replace the team's latest snapshot and today's history row.
    async fn upsert_snapshot(&self, snapshot: &PerformanceSnapshot) -> Result<(), StoreError>;

    /// Insert or overwrite the report keyed by `draft.team_name`.
    async fn upsert_report(&self, draft: &QaReportDraft) -> Result<(), StoreError>;

    /// Delete every report whose team name is not in `keep`.
    async fn delete_reports_except(&self, keep: &[String]) -> Result<u64, StoreError>;
}
