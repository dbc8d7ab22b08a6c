//! Test-case execution statuses and validation.
//!
//! Executions are stored as an ordered list per test case. They can be
//! appended or removed by position; removal is destructive.

use crate::error::CoreError;

pub const EXEC_PASS: &str = "pass";
pub const EXEC_FAIL: &str = "fail";
pub const EXEC_BLOCKED: &str = "blocked";
pub const EXEC_NOT_RUN: &str = "not run";

/// All valid execution statuses.
pub const VALID_EXECUTION_STATUSES: &[&str] = &[EXEC_PASS, EXEC_FAIL, EXEC_BLOCKED, EXEC_NOT_RUN];

/// Status recorded when the caller does not supply one.
pub const DEFAULT_EXECUTION_STATUS: &str = EXEC_NOT_RUN;

/// Maximum length for the free-text `actual_result` and `comments` fields.
pub const MAX_EXECUTION_TEXT_LENGTH: usize = 5_000;

/// Validate an execution status string.
pub fn validate_execution_status(status: &str) -> Result<(), CoreError> {
    if VALID_EXECUTION_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid execution status '{status}'. Must be one of: {VALID_EXECUTION_STATUSES:?}"
        )))
    }
}

/// Validate a free-text execution field.
pub fn validate_execution_text(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    match value {
        Some(v) if v.chars().count() > MAX_EXECUTION_TEXT_LENGTH => Err(CoreError::Validation(
            format!("{field} exceeds maximum length of {MAX_EXECUTION_TEXT_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

/// Validate a zero-based execution position against the current list length.
pub fn validate_execution_index(index: i64, len: usize) -> Result<usize, CoreError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid execution index {index}; test case has {len} execution(s)"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_are_valid() {
        for s in VALID_EXECUTION_STATUSES {
            assert!(validate_execution_status(s).is_ok());
        }
        assert!(validate_execution_status("not_run").is_err());
        assert!(validate_execution_status("skipped").is_err());
    }

    #[test]
    fn index_must_be_in_range() {
        assert_eq!(validate_execution_index(0, 3).unwrap(), 0);
        assert_eq!(validate_execution_index(2, 3).unwrap(), 2);
        assert!(validate_execution_index(3, 3).is_err());
        assert!(validate_execution_index(-1, 3).is_err());
        assert!(validate_execution_index(0, 0).is_err());
    }

    #[test]
    fn text_length_limit() {
        assert!(validate_execution_text("actual_result", None).is_ok());
        assert!(validate_execution_text("actual_result", Some("ok")).is_ok());
        let long = "x".repeat(MAX_EXECUTION_TEXT_LENGTH + 1);
        assert!(validate_execution_text("comments", Some(&long)).is_err());
    }
}
