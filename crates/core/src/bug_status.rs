//! Bug status and severity vocabularies, plus audit-log rules.
//!
//! Every status change on a bug appends one entry to its status history.
//! The history is append-only: entries are never edited or removed.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Initial status for a newly logged bug.
pub const STATUS_OPEN: &str = "open";
/// A team member is looking at the bug.
pub const STATUS_IN_REVIEW: &str = "in review";
/// The underlying defect has been fixed.
pub const STATUS_RESOLVED: &str = "resolved";
/// The bug has been verified and closed.
pub const STATUS_CLOSED: &str = "closed";

/// All valid bug statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_OPEN, STATUS_IN_REVIEW, STATUS_RESOLVED, STATUS_CLOSED];

/// Statuses that count a bug as fixed for metrics purposes.
pub const RESOLVED_STATUSES: &[&str] = &[STATUS_RESOLVED, STATUS_CLOSED];

// ---------------------------------------------------------------------------
// Severity constants
// ---------------------------------------------------------------------------

pub const SEVERITY_LOW: &str = "low";
pub const SEVERITY_MEDIUM: &str = "medium";
pub const SEVERITY_HIGH: &str = "high";
pub const SEVERITY_CRITICAL: &str = "critical";

/// All valid severities, lowest first.
pub const VALID_SEVERITIES: &[&str] = &[
    SEVERITY_LOW,
    SEVERITY_MEDIUM,
    SEVERITY_HIGH,
    SEVERITY_CRITICAL,
];

/// Severity assigned when the reporter leaves it blank.
pub const DEFAULT_SEVERITY: &str = SEVERITY_MEDIUM;

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

/// Maximum length for a bug title (characters).
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for a status-change comment (characters).
pub const MAX_STATUS_COMMENT_LENGTH: usize = 2_000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns `true` if the status counts the bug as resolved.
pub fn is_resolved(status: &str) -> bool {
    RESOLVED_STATUSES.contains(&status)
}

/// Validate that a status string is one of the known statuses.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid bug status '{status}'. Must be one of: {VALID_STATUSES:?}"
        )))
    }
}

/// Validate that a severity string is one of the known severities.
pub fn validate_severity(severity: &str) -> Result<(), CoreError> {
    if VALID_SEVERITIES.contains(&severity) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid bug severity '{severity}'. Must be one of: {VALID_SEVERITIES:?}"
        )))
    }
}

/// Validate the required free-text fields of a new bug.
pub fn validate_new_bug(
    title: &str,
    description: &str,
    reproduction_steps: &[String],
) -> Result<(), CoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::Validation("Bug title is required".into()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Bug title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    if description.trim().is_empty() {
        return Err(CoreError::Validation("Bug description is required".into()));
    }
    if reproduction_steps.iter().all(|s| s.trim().is_empty()) {
        return Err(CoreError::Validation(
            "At least one reproduction step is required".into(),
        ));
    }
    Ok(())
}

/// Validate an optional status-change comment.
pub fn validate_status_comment(comment: Option<&str>) -> Result<(), CoreError> {
    match comment {
        Some(c) if c.chars().count() > MAX_STATUS_COMMENT_LENGTH => Err(CoreError::Validation(
            format!("Status comment exceeds maximum length of {MAX_STATUS_COMMENT_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

/// Whether moving from `current` to `next` produces a history entry.
///
/// Any known status may follow any other; re-submitting the current status
/// is a no-op and leaves the log untouched.
pub fn needs_history_entry(current: &str, next: &str) -> Result<bool, CoreError> {
    validate_status(next)?;
    Ok(current != next)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
