//! Query-string parameter types shared by list endpoints.

use serde::Deserialize;
use tavern_db::models::quest::QuestFilter;
use tavern_db::repositories::quest_repo::clamp_limit;

/// `GET /api/v1/quests` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct QuestListParams {
    pub status: Option<String>,
    pub level_bracket: Option<String>,
    pub limit: Option<i64>,
}

impl QuestListParams {
    /// Blank filters are ignored; the limit is defaulted and clamped.
    pub fn into_filter(self) -> QuestFilter {
        QuestFilter {
            status: non_blank(self.status),
            level_bracket: non_blank(self.level_bracket),
            limit: clamp_limit(self.limit),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
