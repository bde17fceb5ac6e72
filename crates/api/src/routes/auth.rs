use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Dashboard login routes, mounted at the root so the Discord redirect URI
/// stays `/auth/callback`.
///
/// ```text
/// GET  /auth/login      -> redirect to Discord
/// GET  /auth/callback   -> exchange code, set session cookie
/// POST /auth/logout     -> clear session cookie
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", post(auth::logout))
}
