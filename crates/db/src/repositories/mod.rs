//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod bug_repo;
pub mod discussion_thread_repo;
pub mod experiment_repo;
pub mod performance_metric_repo;
pub mod qa_report_repo;
pub mod team_repo;
pub mod test_case_repo;
pub mod user_repo;

pub use bug_repo::BugRepo;
pub use discussion_thread_repo::DiscussionThreadRepo;
pub use experiment_repo::ExperimentRepo;
pub use performance_metric_repo::PerformanceMetricRepo;
pub use qa_report_repo::QaReportRepo;
pub use team_repo::TeamRepo;
pub use test_case_repo::TestCaseRepo;
pub use user_repo::UserRepo;
