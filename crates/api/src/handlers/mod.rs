pub mod bugs;
pub mod dashboard;
pub mod discussions;
pub mod metrics;
pub mod reports;
pub mod test_cases;
