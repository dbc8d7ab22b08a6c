//! [`QaStore`] backed by the PostgreSQL repositories.

use async_trait::async_trait;
use qalab_core::qa_metrics::{BugSample, ExecutionSample, PerformanceSnapshot, QaReportDraft};
use qalab_core::types::DbId;
use qalab_db::repositories::{BugRepo, PerformanceMetricRepo, QaReportRepo, TeamRepo, TestCaseRepo};
use qalab_db::DbPool;

use crate::store::{QaStore, StoreError, TeamRecord, TeamRoster};

#[derive(Clone)]
pub struct PgQaStore {
    pool: DbPool,
}

impl PgQaStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QaStore for PgQaStore {
    async fn list_teams(&self) -> Result<Vec<TeamRecord>, StoreError> {
        let teams = TeamRepo::list_with_period(&self.pool).await?;
        Ok(teams
            .into_iter()
            .map(|t| TeamRecord {
                id: t.id,
                name: t.name,
                period_start: t.period_start,
                period_end: t.period_end,
            })
            .collect())
    }

    async fn resolve_roster(&self, team_id: DbId) -> Result<TeamRoster, StoreError> {
        if TeamRepo::find_by_id(&self.pool, team_id).await?.is_none() {
            return Err(StoreError::NotFound {
                entity: "Team",
                id: team_id,
            });
        }
        let member_ids = TeamRepo::member_ids(&self.pool, team_id).await?;
        let test_case_ids = TestCaseRepo::assigned_ids_for_team(&self.pool, team_id).await?;
        Ok(TeamRoster {
            member_ids,
            test_case_ids,
        })
    }

    async fn bugs_for_team(&self, team_id: DbId) -> Result<Vec<BugSample>, StoreError> {
        let bugs = BugRepo::list_for_team(&self.pool, team_id).await?;
        Ok(bugs.iter().map(BugSample::from).collect())
    }

    async fn executions_for_test_cases(
        &self,
        test_case_ids: &[DbId],
    ) -> Result<Vec<ExecutionSample>, StoreError> {
        let executions = TestCaseRepo::executions_for_test_cases(&self.pool, test_case_ids).await?;
        Ok(executions.iter().map(ExecutionSample::from).collect())
    }

    async fn upsert_snapshot(&self, snapshot: &PerformanceSnapshot) -> Result<(), StoreError> {
        PerformanceMetricRepo::upsert_latest(&self.pool, snapshot).await?;
        PerformanceMetricRepo::upsert_history_for_day(&self.pool, snapshot).await?;
        Ok(())
    }

    async fn upsert_report(&self, draft: &QaReportDraft) -> Result<(), StoreError> {
        QaReportRepo::upsert(&self.pool, draft).await?;
        Ok(())
    }

    async fn delete_reports_except(&self, keep: &[String]) -> Result<u64, StoreError> {
        Ok(QaReportRepo::delete_except(&self.pool, keep).await?)
    }
}
