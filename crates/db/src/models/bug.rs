//! Bug entity model, status audit log, and DTOs.

use qalab_core::qa_metrics::BugSample;
use qalab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `bugs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bug {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub reproduction_steps: Vec<String>,
    /// Screenshot URLs attached by the reporter.
    pub screenshots: Vec<String>,
    pub severity: String,
    pub reporter_id: DbId,
    pub team_id: DbId,
    pub current_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Bug> for BugSample {
    fn from(bug: &Bug) -> Self {
        BugSample {
            severity: Some(bug.severity.clone()),
            current_status: bug.current_status.clone(),
            created_at: bug.created_at,
            updated_at: bug.updated_at,
        }
    }
}

/// A row from the append-only `bug_status_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BugStatusEntry {
    pub id: DbId,
    pub bug_id: DbId,
    pub status: String,
    pub changed_by: DbId,
    pub changed_at: Timestamp,
    pub comment: Option<String>,
}

/// DTO for logging a new bug. The reporter comes from the caller's identity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBug {
    pub title: String,
    pub description: String,
    pub reproduction_steps: Vec<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
    pub severity: Option<String>,
    pub team_id: DbId,
}

/// DTO for a status transition.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeBugStatus {
    pub status: String,
    pub comment: Option<String>,
}

/// A bug joined with its team name, for activity feeds.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentBug {
    pub id: DbId,
    pub title: String,
    pub team_name: Option<String>,
    pub created_at: Timestamp,
}
