//! The [`AuthUser`] extractor. Every `/api/v1` handler takes one (directly or
//! through [`RequireInstructor`](super::rbac::RequireInstructor)), so an
//! unauthenticated request never reaches a repository.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use qalab_core::error::CoreError;
use qalab_core::roles::{ROLE_INSTRUCTOR, ROLE_STUDENT};
use qalab_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller, taken from `Authorization: Bearer <token>`.
///
/// Missing, malformed, expired or foreign tokens, and tokens carrying a role
/// other than instructor or student, are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
}

impl AuthUser {
    pub fn is_instructor(&self) -> bool {
        self.role == ROLE_INSTRUCTOR
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Expected 'Authorization: Bearer <token>'"))?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        if claims.role != ROLE_INSTRUCTOR && claims.role != ROLE_STUDENT {
            tracing::warn!(user_id = claims.sub, role = %claims.role, "Token with unknown role");
            return Err(unauthorized("Token role is not recognised"));
        }

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}
