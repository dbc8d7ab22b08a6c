//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Accounts and login live outside this service; it only verifies the
//! tokens issued for them.

pub mod jwt;
