//! User entity model. Accounts are managed elsewhere; the QA lab only reads
//! identities for authorship and team membership.

use qalab_core::discussion::AuthorSummary;
use qalab_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for AuthorSummary {
    fn from(user: User) -> Self {
        AuthorSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// DTO for creating a user (seeding and tests).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role: String,
}
