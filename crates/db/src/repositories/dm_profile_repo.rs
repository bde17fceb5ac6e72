//! Repository for the `dm_profiles` table.

use sqlx::{PgExecutor, PgPool};
use tavern_core::types::DiscordId;

use crate::models::dm_profile::DmProfile;

const COLUMNS: &str = "user_id, preferred_dm_name, created_at, updated_at";

/// Read/write access to DM display names.
pub struct DmProfileRepo;

impl DmProfileRepo {
    pub async fn find(pool: &PgPool, user_id: DiscordId) -> Result<Option<DmProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dm_profiles WHERE user_id = $1");
        sqlx::query_as::<_, DmProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or replace the user's preferred DM name.
    ///
    /// Generic over the executor so it can run inside a caller's transaction.
    pub async fn upsert<'e, E>(
        executor: E,
        user_id: DiscordId,
        preferred_dm_name: &str,
    ) -> Result<DmProfile, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO dm_profiles (user_id, preferred_dm_name)
             VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE
                SET preferred_dm_name = EXCLUDED.preferred_dm_name,
                    updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DmProfile>(&query)
            .bind(user_id)
            .bind(preferred_dm_name)
            .fetch_one(executor)
            .await
    }
}
