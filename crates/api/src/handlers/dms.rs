use axum::extract::State;
use axum::Json;
use tavern_db::models::quest::DmStat;
use tavern_db::repositories::QuestRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dms/stats
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<DmStat>>>> {
    let dms = QuestRepo::dm_stats(&state.pool).await?;
    Ok(Json(DataResponse { data: dms }))
}
