//! Team entity model and roster views.

use qalab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub name: String,
    pub experiment_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for creating a team.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeam {
    pub name: String,
    pub experiment_id: DbId,
}

/// A team joined with its experiment's period, as read by the aggregator.
#[derive(Debug, Clone, FromRow)]
pub struct TeamWithPeriod {
    pub id: DbId,
    pub name: String,
    pub experiment_id: DbId,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
}
