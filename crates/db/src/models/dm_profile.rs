//! DM profile model.

use serde::Serialize;
use sqlx::FromRow;
use tavern_core::types::{DiscordId, Timestamp};

/// A row from the `dm_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DmProfile {
    pub user_id: DiscordId,
    pub preferred_dm_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
