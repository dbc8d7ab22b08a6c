//! Experiment entity model.

use qalab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `experiments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Experiment {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub methodology: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating an experiment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExperiment {
    pub title: String,
    pub description: Option<String>,
    pub methodology: String,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}
