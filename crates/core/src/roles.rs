//! Well-known role name constants.
//!
//! These must match the `role` values stored in the `users` table.

pub const ROLE_INSTRUCTOR: &str = "instructor";
pub const ROLE_STUDENT: &str = "student";
