//! Discord OAuth login, callback and logout.
//!
//! Login redirects to Discord with a random `state` stored in a short-lived
//! cookie. The callback checks that state, exchanges the code, requires
//! membership of the configured guild, and issues the session JWT as an
//! HttpOnly cookie.

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use serde::Deserialize;
use tavern_core::error::CoreError;
use uuid::Uuid;

use crate::auth::jwt::generate_session_token;
use crate::auth::oauth;
use crate::auth::session::{
    build_cookie, clear_cookie, read_cookie, OAUTH_STATE_COOKIE, OAUTH_STATE_MAX_AGE_SECS,
    SESSION_COOKIE,
};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query parameters Discord appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set when the user denied consent.
    pub error: Option<String>,
}

/// GET /auth/login
pub async fn login(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let discord = &state.config.discord;
    if !discord.is_configured() {
        return Err(AppError::Core(CoreError::Configuration(
            "DISCORD_CLIENT_ID and DISCORD_CLIENT_SECRET must be set for dashboard login".into(),
        )));
    }

    let nonce = Uuid::new_v4().to_string();
    let url = discord.authorize_url(&nonce)?;
    let cookie = build_cookie(
        OAUTH_STATE_COOKIE,
        &nonce,
        OAUTH_STATE_MAX_AGE_SECS,
        state.config.secure_cookies,
    )
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Redirect::to(url.as_str()),
    ))
}

/// GET /auth/callback
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(error) = params.error {
        return Err(AppError::Core(CoreError::Unauthorized(format!(
            "Discord login was not completed: {error}"
        ))));
    }
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("No authorization code provided".into()))?;

    let expected = read_cookie(&headers, OAUTH_STATE_COOKIE);
    if expected.is_none() || expected != params.state.as_deref() {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Login state mismatch; please sign in again".into(),
        )));
    }

    let guild_id = state.config.guild_id.ok_or_else(|| {
        AppError::Core(CoreError::Forbidden(
            "Dashboard login is disabled: no guild is configured".into(),
        ))
    })?;

    let discord = &state.config.discord;
    let token = oauth::exchange_code(&state.http, discord, &code).await?;
    let user = oauth::fetch_user(&state.http, discord, &token.access_token).await?;
    let user_id = user.discord_id()?;

    if !oauth::is_guild_member(&state.http, discord, &token.access_token, guild_id).await? {
        tracing::info!(user_id, guild_id, "Dashboard login refused: not a guild member");
        return Err(AppError::Core(CoreError::Forbidden(
            "You must be a member of the Discord server to access this dashboard".into(),
        )));
    }

    let session = generate_session_token(
        user_id,
        user.display_name(),
        user.avatar.as_deref(),
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Failed to sign session token: {e}")))?;

    let secure = state.config.secure_cookies;
    let session_cookie = build_cookie(
        SESSION_COOKIE,
        &session,
        state.config.jwt.expiry_secs(),
        secure,
    )
    .map_err(|e| AppError::InternalError(e.to_string()))?;
    let state_cookie = clear_cookie(OAUTH_STATE_COOKIE, secure)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::info!(user_id, username = %user.display_name(), "Dashboard login");
    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie), (SET_COOKIE, state_cookie)]),
        Redirect::to("/"),
    ))
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let cookie = clear_cookie(SESSION_COOKIE, state.config.secure_cookies)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    Ok((StatusCode::NO_CONTENT, AppendHeaders([(SET_COOKIE, cookie)])))
}
