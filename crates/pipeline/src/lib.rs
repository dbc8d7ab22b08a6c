//! QA metrics aggregation pipeline.
//!
//! The [`Aggregator`] walks every team, collects bug and test-execution
//! metrics through a [`QaStore`], upserts the team's performance snapshot
//! and QA report, and finally deletes reports for teams that no longer
//! exist.

pub mod aggregator;
pub mod error;
pub mod pg_store;
pub mod store;

pub use aggregator::{AggregationOutcome, Aggregator};
pub use error::PipelineError;
pub use pg_store::PgQaStore;
pub use store::{QaStore, StoreError, TeamRecord, TeamRoster};
