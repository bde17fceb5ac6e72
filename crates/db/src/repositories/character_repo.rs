//! Repository for the `characters` table.
//!
//! Ledger writes (`reset_daily`, `award_xp`, `update_buffer`) are single
//! guarded `UPDATE` statements: each carries the values the caller computed
//! against and affects zero rows if another writer got there first.

use sqlx::PgPool;
use tavern_core::cap_policy::{LedgerGuard, XpDelta};
use tavern_core::types::{DbId, DiscordId, Timestamp};

use crate::models::character::{Character, CreateCharacter, XpTotals};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, total_xp, daily_xp, char_buffer, last_reset_at, \
     is_active, character_sheet_url, image_url, created_at, updated_at";

/// Provides character CRUD plus the atomic XP ledger writes.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    ///
    /// The character starts active if the owner has no active character.
    pub async fn create(pool: &PgPool, input: &CreateCharacter) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (user_id, name, character_sheet_url, image_url, is_active)
             VALUES ($1, $2, $3, $4,
                     NOT EXISTS (SELECT 1 FROM characters WHERE user_id = $1 AND is_active))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.character_sheet_url)
            .bind(&input.image_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a character by owner and name.
    pub async fn find_by_name(
        pool: &PgPool,
        user_id: DiscordId,
        name: &str,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE user_id = $1 AND name = $2");
        sqlx::query_as::<_, Character>(&query)
            .bind(user_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// The owner's active character, if any.
    pub async fn find_active(
        pool: &PgPool,
        user_id: DiscordId,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM characters WHERE user_id = $1 AND is_active");
        sqlx::query_as::<_, Character>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List the owner's characters, ordered by name ascending.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DiscordId,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM characters WHERE user_id = $1 ORDER BY name ASC");
        sqlx::query_as::<_, Character>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Make the named character the owner's only active character.
    ///
    /// Returns `None` if the owner has no character with that name.
    pub async fn activate(
        pool: &PgPool,
        user_id: DiscordId,
        name: &str,
    ) -> Result<Option<Character>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let target: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM characters WHERE user_id = $1 AND name = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(id) = target else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE characters SET is_active = FALSE, updated_at = NOW()
             WHERE user_id = $1 AND is_active AND id <> $2",
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE characters SET is_active = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let character = sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(character))
    }

    /// Zero `daily_xp` and stamp `last_reset_at = now`.
    ///
    /// Only applies if `last_reset_at` still equals `observed_reset_at` and
    /// is earlier than `now`, so concurrent resets for the same day commit
    /// once and the stamp never moves backwards. Returns `true` if this call
    /// performed the reset.
    pub async fn reset_daily(
        pool: &PgPool,
        user_id: DiscordId,
        name: &str,
        observed_reset_at: Timestamp,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE characters SET daily_xp = 0, last_reset_at = $4, updated_at = NOW()
             WHERE user_id = $1 AND name = $2 AND last_reset_at = $3 AND last_reset_at < $4",
        )
        .bind(user_id)
        .bind(name)
        .bind(observed_reset_at)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply XP, daily XP and buffer deltas in one statement.
    ///
    /// Returns `None` when the row no longer matches `expected` (or does not
    /// exist); the caller should re-read and recompute.
    pub async fn award_xp(
        pool: &PgPool,
        user_id: DiscordId,
        name: &str,
        delta: &XpDelta,
        expected: &LedgerGuard,
    ) -> Result<Option<XpTotals>, sqlx::Error> {
        let new_total: Option<i64> = sqlx::query_scalar(
            "UPDATE characters SET
                total_xp = total_xp + $3,
                daily_xp = daily_xp + $4,
                char_buffer = char_buffer + $5,
                updated_at = NOW()
             WHERE user_id = $1 AND name = $2 AND daily_xp = $6 AND char_buffer = $7
             RETURNING total_xp",
        )
        .bind(user_id)
        .bind(name)
        .bind(delta.xp)
        .bind(delta.daily_xp)
        .bind(delta.char_buffer)
        .bind(expected.daily_xp)
        .bind(expected.char_buffer)
        .fetch_optional(pool)
        .await?;

        Ok(new_total.map(|new_total_xp| XpTotals {
            old_total_xp: new_total_xp - delta.xp,
            new_total_xp,
        }))
    }

    /// Replace the typed-character buffer without awarding XP.
    ///
    /// Returns `false` when the buffer no longer equals `expected_buffer`.
    pub async fn update_buffer(
        pool: &PgPool,
        user_id: DiscordId,
        name: &str,
        expected_buffer: i64,
        new_buffer: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE characters SET char_buffer = $4, updated_at = NOW()
             WHERE user_id = $1 AND name = $2 AND char_buffer = $3",
        )
        .bind(user_id)
        .bind(name)
        .bind(expected_buffer)
        .bind(new_buffer)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
