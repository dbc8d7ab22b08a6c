//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use qalab_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `instructor` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn instructor_only(RequireInstructor(user): RequireInstructor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireInstructor(pub AuthUser);

impl FromRequestParts<AppState> for RequireInstructor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_instructor() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Instructor role required".into(),
            )));
        }
        Ok(RequireInstructor(user))
    }
}
