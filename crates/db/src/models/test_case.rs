//! Test case entity model, embedded executions, and DTOs.

use qalab_core::qa_metrics::ExecutionSample;
use qalab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `test_cases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestCase {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    pub author_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a test case and its team assignments.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestCase {
    pub title: String,
    pub description: Option<String>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub assigned_team_ids: Vec<DbId>,
}

/// A row from the `test_executions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestExecution {
    pub id: DbId,
    pub test_case_id: DbId,
    pub team_id: DbId,
    pub executed_by: Option<DbId>,
    pub status: String,
    pub actual_result: Option<String>,
    pub comments: String,
    pub executed_at: Timestamp,
}

impl From<&TestExecution> for ExecutionSample {
    fn from(exec: &TestExecution) -> Self {
        ExecutionSample {
            team_id: exec.team_id,
            status: exec.status.clone(),
        }
    }
}

/// DTO for recording an execution against a test case.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestExecution {
    pub team_id: DbId,
    pub executed_by: Option<DbId>,
    pub status: Option<String>,
    pub actual_result: Option<String>,
    pub comments: Option<String>,
}
