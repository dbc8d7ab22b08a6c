//! Domain logic for the QA lab: metric formulas, dashboard folding,
//! discussion trees and report rendering.
//!
//! This crate has no database dependencies; all data is passed in by the
//! caller.

pub mod bug_status;
pub mod dashboard;
pub mod discussion;
pub mod error;
pub mod pagination;
pub mod qa_metrics;
pub mod report_export;
pub mod roles;
pub mod test_execution;
pub mod types;
