//! Admin gate for write and diagnostic routes.
//!
//! Sign-in itself happens in the authentication proxy in front of this
//! service, which forwards the verified address in [`EMAIL_HEADER`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

pub const EMAIL_HEADER: &str = "x-auth-request-email";

#[derive(Debug, Clone)]
pub struct AdminUser {
    pub email: String,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let email = parts
            .headers
            .get(EMAIL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(AppError::Unauthenticated)?;

        let role = state.admins.role_for_email(email);
        if !role.is_admin() {
            tracing::warn!(email, %role, "admin action refused");
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser {
            email: email.to_string(),
        })
    }
}
