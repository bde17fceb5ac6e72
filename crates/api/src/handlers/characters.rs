use axum::extract::{Path, State};
use axum::Json;
use tavern_core::error::CoreError;
use tavern_core::types::DbId;
use tavern_db::models::quest::CharacterQuestEntry;
use tavern_db::repositories::{CharacterRepo, QuestRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/characters/{id}/quests
pub async fn quest_history(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CharacterQuestEntry>>>> {
    if CharacterRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id,
        }));
    }
    let history = QuestRepo::character_history(&state.pool, id).await?;
    Ok(Json(DataResponse { data: history }))
}
