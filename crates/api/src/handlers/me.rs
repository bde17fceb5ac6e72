//! Handler for the current dashboard session.

use axum::Json;
use serde::Serialize;
use tavern_core::types::DiscordId;

use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// The signed-in user as shown in the dashboard header.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: DiscordId,
    pub username: String,
    pub avatar: Option<String>,
}

/// GET /api/v1/me
pub async fn get_me(user: AuthUser) -> Json<DataResponse<MeResponse>> {
    Json(DataResponse {
        data: MeResponse {
            user_id: user.user_id,
            username: user.username,
            avatar: user.avatar,
        },
    })
}
