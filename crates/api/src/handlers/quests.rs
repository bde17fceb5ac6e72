//! Handlers for the `/quests` reports and the DM rename action.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tavern_core::error::CoreError;
use tavern_core::types::{DbId, DiscordId};
use tavern_core::validation::normalize_dm_name;
use tavern_db::models::quest::{QuestDetail, QuestSummary};
use tavern_db::repositories::QuestRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::QuestListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/quests
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<QuestListParams>,
) -> AppResult<Json<DataResponse<Vec<QuestSummary>>>> {
    let quests = QuestRepo::list(&state.pool, &params.into_filter()).await?;
    Ok(Json(DataResponse { data: quests }))
}

/// GET /api/v1/quests/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<QuestDetail>>> {
    let quest = QuestRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Quest",
            id,
        }))?;
    Ok(Json(DataResponse { data: quest }))
}

/// GET /api/v1/quests/level-brackets
pub async fn level_brackets(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let brackets = QuestRepo::level_brackets(&state.pool).await?;
    Ok(Json(DataResponse { data: brackets }))
}

/// GET /api/v1/quests/types
pub async fn quest_types(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let types = QuestRepo::quest_types(&state.pool).await?;
    Ok(Json(DataResponse { data: types }))
}

#[derive(Debug, Deserialize)]
pub struct RenameDmRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RenameDmResponse {
    pub success: bool,
    pub name: String,
}

/// POST /api/v1/quests/{quest_id}/dms/{user_id}/name
///
/// Renames the DM everywhere, not only on `quest_id`: the name is stored on
/// the DM's profile and rewritten on all of their quest assignments.
pub async fn rename_dm(
    user: AuthUser,
    State(state): State<AppState>,
    Path((quest_id, dm_user_id)): Path<(DbId, DiscordId)>,
    Json(input): Json<RenameDmRequest>,
) -> AppResult<Json<RenameDmResponse>> {
    let name = normalize_dm_name(&input.name)?;
    let profile = QuestRepo::rename_dm(&state.pool, dm_user_id, &name).await?;

    tracing::info!(
        quest_id,
        dm_user_id,
        renamed_by = user.user_id,
        name = %profile.preferred_dm_name,
        "DM renamed from dashboard"
    );
    Ok(Json(RenameDmResponse {
        success: true,
        name: profile.preferred_dm_name,
    }))
}
