//! Repository for the `guild_configs` table.

use sqlx::PgPool;
use tavern_core::guild_config::GuildConfig;
use tavern_core::types::DiscordId;

/// Loads and stores the per-guild configuration blob.
pub struct GuildConfigRepo;

impl GuildConfigRepo {
    /// Load a guild's configuration. A missing row yields the defaults.
    pub async fn get(pool: &PgPool, guild_id: DiscordId) -> Result<GuildConfig, sqlx::Error> {
        let settings: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT settings FROM guild_configs WHERE guild_id = $1")
                .bind(guild_id)
                .fetch_optional(pool)
                .await?;

        match settings {
            Some(value) => decode(value),
            None => Ok(GuildConfig::default()),
        }
    }

    /// Fully replace a guild's configuration.
    pub async fn save(
        pool: &PgPool,
        guild_id: DiscordId,
        config: &GuildConfig,
    ) -> Result<(), sqlx::Error> {
        let settings = encode(config)?;
        sqlx::query(
            "INSERT INTO guild_configs (guild_id, settings) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE
                SET settings = EXCLUDED.settings, updated_at = NOW()",
        )
        .bind(guild_id)
        .bind(settings)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Read-modify-write a guild's configuration under a row lock.
    ///
    /// Concurrent updates (two admins toggling channels) serialize instead
    /// of overwriting each other. Returns the stored configuration.
    pub async fn update<F>(
        pool: &PgPool,
        guild_id: DiscordId,
        apply: F,
    ) -> Result<GuildConfig, sqlx::Error>
    where
        F: FnOnce(&mut GuildConfig) + Send,
    {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO guild_configs (guild_id) VALUES ($1) ON CONFLICT (guild_id) DO NOTHING",
        )
        .bind(guild_id)
        .execute(&mut *tx)
        .await?;

        let current: serde_json::Value =
            sqlx::query_scalar("SELECT settings FROM guild_configs WHERE guild_id = $1 FOR UPDATE")
                .bind(guild_id)
                .fetch_one(&mut *tx)
                .await?;

        let mut config = decode(current)?;
        apply(&mut config);

        sqlx::query(
            "UPDATE guild_configs SET settings = $2, updated_at = NOW() WHERE guild_id = $1",
        )
        .bind(guild_id)
        .bind(encode(&config)?)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(config)
    }

    /// The guild's level-up log channel, if one is configured.
    pub async fn log_channel_id(
        pool: &PgPool,
        guild_id: DiscordId,
    ) -> Result<Option<DiscordId>, sqlx::Error> {
        let channel: Option<Option<i64>> = sqlx::query_scalar(
            "SELECT (settings->>'log_channel_id')::bigint FROM guild_configs WHERE guild_id = $1",
        )
        .bind(guild_id)
        .fetch_optional(pool)
        .await?;
        Ok(channel.flatten())
    }
}

fn decode(value: serde_json::Value) -> Result<GuildConfig, sqlx::Error> {
    serde_json::from_value(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn encode(config: &GuildConfig) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(config).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}
