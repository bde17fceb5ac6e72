//! Character entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tavern_core::cap_policy::DailyState;
use tavern_core::types::{DbId, DiscordId, Timestamp};

/// A character row from the `characters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub user_id: DiscordId,
    pub name: String,
    pub total_xp: i64,
    /// RP XP earned since `last_reset_at`.
    pub daily_xp: i64,
    /// Typed characters not yet converted to XP.
    pub char_buffer: i64,
    pub last_reset_at: Timestamp,
    pub is_active: bool,
    pub character_sheet_url: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Character {
    /// The daily-cap slice of this row.
    pub fn daily_state(&self) -> DailyState {
        DailyState {
            daily_xp: self.daily_xp,
            char_buffer: self.char_buffer,
            last_reset_at: self.last_reset_at,
        }
    }
}

/// DTO for creating a new character.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacter {
    pub user_id: DiscordId,
    pub name: String,
    pub character_sheet_url: Option<String>,
    pub image_url: Option<String>,
}

/// Total XP on either side of an atomic award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpTotals {
    pub old_total_xp: i64,
    pub new_total_xp: i64,
}
