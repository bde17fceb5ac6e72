use axum::extract::State;
use axum::Json;
use tavern_db::models::quest::QuestStats;
use tavern_db::repositories::QuestRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/stats
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<DataResponse<QuestStats>>> {
    let stats = QuestRepo::stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
