//! Repository for the `users` table.

use sqlx::PgPool;
use tavern_core::types::DiscordId;

/// Tracks which Discord users have a ledger entry.
pub struct UserRepo;

impl UserRepo {
    /// Insert the user if they are not yet known. Idempotent.
    pub async fn ensure(pool: &PgPool, user_id: DiscordId) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn exists(pool: &PgPool, user_id: DiscordId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
