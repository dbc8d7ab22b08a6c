//! Limit clamping for list endpoints.

/// Default page size for snapshot history.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Largest page size accepted for snapshot history.
pub const MAX_HISTORY_LIMIT: i64 = 500;

/// Clamp a caller-supplied limit into `1..=max`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}
