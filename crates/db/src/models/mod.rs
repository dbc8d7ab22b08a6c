//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Update DTOs where the entity supports mutation

pub mod bug;
pub mod discussion_thread;
pub mod experiment;
pub mod performance_metric;
pub mod qa_report;
pub mod team;
pub mod test_case;
pub mod user;
