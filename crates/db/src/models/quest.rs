//! Quest reporting models used by the dashboard.
//!
//! Quests are read-only from this codebase apart from DM display names.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tavern_core::types::{DbId, DiscordId, Timestamp};

/// Valid quest status values.
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid status strings.
pub const VALID_STATUSES: &[&str] = &[STATUS_ACTIVE, STATUS_COMPLETED, STATUS_CANCELLED];

/// A row from the `quests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quest {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub level_bracket: String,
    pub quest_type: String,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A quest with aggregate roster information for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub quest: Quest,
    pub participant_count: i64,
    /// Resolved DM display names.
    pub dm_usernames: Vec<String>,
}

/// A character taking part in a quest.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestParticipant {
    pub quest_id: DbId,
    pub character_id: DbId,
    pub character_name: String,
    pub user_id: DiscordId,
    pub starting_level: i32,
    pub starting_xp: i64,
    pub joined_at: Timestamp,
}

/// A DM assigned to a quest, with the display name resolved through
/// `dm_profiles`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestDm {
    pub quest_id: DbId,
    pub user_id: DiscordId,
    pub username: String,
    pub is_primary: bool,
    pub joined_at: Timestamp,
}

/// Full quest detail for the quest page.
#[derive(Debug, Clone, Serialize)]
pub struct QuestDetail {
    #[serde(flatten)]
    pub quest: Quest,
    pub participants: Vec<QuestParticipant>,
    pub dms: Vec<QuestDm>,
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestStats {
    pub total_quests: i64,
    pub active_quests: i64,
    pub completed_quests: i64,
    pub total_participants: i64,
    pub total_dms: i64,
    /// Rounded to one decimal place.
    pub avg_participants_per_quest: f64,
}

/// Quest counts for a single DM.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DmStat {
    pub user_id: DiscordId,
    pub username: String,
    pub quest_count: i64,
    pub primary_dm_count: i64,
}

/// One entry of a character's quest history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CharacterQuestEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub quest: Quest,
    pub starting_level: i32,
    pub starting_xp: i64,
    pub joined_at: Timestamp,
}

/// Filters for the quest list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestFilter {
    pub status: Option<String>,
    pub level_bracket: Option<String>,
    pub limit: i64,
}
