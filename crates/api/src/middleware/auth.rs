//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tavern_core::error::CoreError;
use tavern_core::types::DiscordId;

use crate::auth::jwt::validate_token;
use crate::auth::session::{read_cookie, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::AppState;

/// Dashboard user authenticated by a session JWT.
///
/// The token is taken from `Authorization: Bearer <token>` when present,
/// otherwise from the `session` cookie set by the OAuth callback.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's Discord id (from `claims.sub`).
    pub user_id: DiscordId,
    pub username: String,
    pub avatar: Option<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match parts.headers.get(AUTHORIZATION) {
            Some(header) => header
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or_else(|| {
                    AppError::Core(CoreError::Unauthorized(
                        "Invalid Authorization format. Expected: Bearer <token>".into(),
                    ))
                })?,
            None => read_cookie(&parts.headers, SESSION_COOKIE).ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized("Not logged in".into()))
            })?,
        };

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired session".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            username: claims.username,
            avatar: claims.avatar,
        })
    }
}
