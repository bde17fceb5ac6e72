//! Storage seam for the accrual path.
//!
//! [`XpLedger`] is everything the orchestrator needs from storage.
//! [`PgLedger`] implements it on top of the `tavern-db` repositories; tests
//! substitute an in-memory fake.

use std::sync::Arc;

use async_trait::async_trait;
use tavern_core::cap_policy::{LedgerGuard, XpDelta};
use tavern_core::guild_config::GuildConfig;
use tavern_core::leveling::{LevelTable, XpAwardResult};
use tavern_core::types::{DiscordId, Timestamp};
use tavern_db::models::character::Character;
use tavern_db::repositories::{CharacterRepo, GuildConfigRepo, UserRepo};
use tavern_db::DbPool;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// A guarded write found the row changed since it was read.
    #[error("Concurrent update to character '{name}' of user {owner_id}")]
    Conflict { owner_id: DiscordId, name: String },

    #[error("Character '{name}' not found for user {owner_id}")]
    NotFound { owner_id: DiscordId, name: String },
}

// ---------------------------------------------------------------------------
// XpLedger
// ---------------------------------------------------------------------------

/// Character ledger and guild configuration storage.
#[async_trait]
pub trait XpLedger: Send + Sync {
    /// The guild's configuration; defaults when none is stored.
    async fn get_config(&self, guild_id: DiscordId) -> Result<GuildConfig, LedgerError>;

    /// Make sure the owner is known to the ledger. Idempotent.
    async fn ensure_ledger_entry(&self, owner_id: DiscordId) -> Result<(), LedgerError>;

    async fn get_active_character(
        &self,
        owner_id: DiscordId,
    ) -> Result<Option<Character>, LedgerError>;

    /// Fails with [`LedgerError::NotFound`] when the character is missing.
    async fn get_character(&self, owner_id: DiscordId, name: &str)
        -> Result<Character, LedgerError>;

    /// Zero `daily_xp` and stamp `last_reset_at = now`, provided the row
    /// still carries `observed_reset_at` and that stamp is earlier than
    /// `now`. Returns `true` if this call reset.
    async fn reset_daily(
        &self,
        owner_id: DiscordId,
        name: &str,
        observed_reset_at: Timestamp,
        now: Timestamp,
    ) -> Result<bool, LedgerError>;

    /// Atomically apply all three deltas, guarded by `expected`.
    ///
    /// Fails with [`LedgerError::Conflict`] when the guard no longer holds.
    async fn award_xp(
        &self,
        owner_id: DiscordId,
        name: &str,
        delta: &XpDelta,
        expected: &LedgerGuard,
    ) -> Result<XpAwardResult, LedgerError>;

    /// Replace the buffer, guarded by `expected_buffer`.
    ///
    /// Fails with [`LedgerError::Conflict`] when the guard no longer holds.
    async fn update_character_buffer(
        &self,
        owner_id: DiscordId,
        name: &str,
        expected_buffer: i64,
        new_buffer: i64,
    ) -> Result<(), LedgerError>;

    async fn get_log_channel_id(
        &self,
        guild_id: DiscordId,
    ) -> Result<Option<DiscordId>, LedgerError>;
}

// ---------------------------------------------------------------------------
// PgLedger
// ---------------------------------------------------------------------------

/// [`XpLedger`] backed by PostgreSQL.
pub struct PgLedger {
    pool: DbPool,
    levels: Arc<LevelTable>,
}

impl PgLedger {
    pub fn new(pool: DbPool, levels: Arc<LevelTable>) -> Self {
        Self { pool, levels }
    }
}

#[async_trait]
impl XpLedger for PgLedger {
    async fn get_config(&self, guild_id: DiscordId) -> Result<GuildConfig, LedgerError> {
        Ok(GuildConfigRepo::get(&self.pool, guild_id).await?)
    }

    async fn ensure_ledger_entry(&self, owner_id: DiscordId) -> Result<(), LedgerError> {
        Ok(UserRepo::ensure(&self.pool, owner_id).await?)
    }

    async fn get_active_character(
        &self,
        owner_id: DiscordId,
    ) -> Result<Option<Character>, LedgerError> {
        Ok(CharacterRepo::find_active(&self.pool, owner_id).await?)
    }

    async fn get_character(
        &self,
        owner_id: DiscordId,
        name: &str,
    ) -> Result<Character, LedgerError> {
        CharacterRepo::find_by_name(&self.pool, owner_id, name)
            .await?
            .ok_or_else(|| LedgerError::NotFound {
                owner_id,
                name: name.to_string(),
            })
    }

    async fn reset_daily(
        &self,
        owner_id: DiscordId,
        name: &str,
        observed_reset_at: Timestamp,
        now: Timestamp,
    ) -> Result<bool, LedgerError> {
        Ok(CharacterRepo::reset_daily(&self.pool, owner_id, name, observed_reset_at, now).await?)
    }

    async fn award_xp(
        &self,
        owner_id: DiscordId,
        name: &str,
        delta: &XpDelta,
        expected: &LedgerGuard,
    ) -> Result<XpAwardResult, LedgerError> {
        let totals = CharacterRepo::award_xp(&self.pool, owner_id, name, delta, expected)
            .await?
            .ok_or_else(|| LedgerError::Conflict {
                owner_id,
                name: name.to_string(),
            })?;
        Ok(self
            .levels
            .award_result(totals.old_total_xp, totals.new_total_xp))
    }

    async fn update_character_buffer(
        &self,
        owner_id: DiscordId,
        name: &str,
        expected_buffer: i64,
        new_buffer: i64,
    ) -> Result<(), LedgerError> {
        let updated =
            CharacterRepo::update_buffer(&self.pool, owner_id, name, expected_buffer, new_buffer)
                .await?;
        if !updated {
            return Err(LedgerError::Conflict {
                owner_id,
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn get_log_channel_id(
        &self,
        guild_id: DiscordId,
    ) -> Result<Option<DiscordId>, LedgerError> {
        Ok(GuildConfigRepo::log_channel_id(&self.pool, guild_id).await?)
    }
}
