use std::fmt::Display;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::NotFound`] with any displayable key
    /// (database ids as well as comment UUIDs).
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
