pub mod auth;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /me                                       current session (requires auth)
/// /stats                                    headline quest statistics
///
/// /quests                                   list (?status, ?level_bracket, ?limit)
/// /quests/level-brackets                    distinct level brackets
/// /quests/types                             distinct quest types
/// /quests/{id}                              detail with participants and DMs
/// /quests/{quest_id}/dms/{user_id}/name     rename DM (POST, requires auth)
///
/// /dms/stats                                top DMs by quest count
///
/// /characters/{id}/quests                   character quest history
/// ```
pub fn api_routes() -> Router<AppState> {
    let quest_routes = Router::new()
        .route("/", get(handlers::quests::list))
        .route("/level-brackets", get(handlers::quests::level_brackets))
        .route("/types", get(handlers::quests::quest_types))
        .route("/{id}", get(handlers::quests::get_by_id))
        .route(
            "/{quest_id}/dms/{user_id}/name",
            post(handlers::quests::rename_dm),
        );

    Router::new()
        .route("/me", get(handlers::me::get_me))
        .route("/stats", get(handlers::stats::get_stats))
        .nest("/quests", quest_routes)
        .route("/dms/stats", get(handlers::dms::stats))
        .route(
            "/characters/{id}/quests",
            get(handlers::characters::quest_history),
        )
}
