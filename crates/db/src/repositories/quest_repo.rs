//! Repository for quest reporting (`quests`, `quest_participants`,
//! `quest_dms`) and DM renames.
//!
//! DM display names resolve as: `dm_profiles.preferred_dm_name`, then the
//! name stored on the assignment, then `User <id>`.

use sqlx::PgPool;
use tavern_core::types::{DbId, DiscordId};

use crate::models::dm_profile::DmProfile;
use crate::models::quest::{
    CharacterQuestEntry, DmStat, Quest, QuestDetail, QuestDm, QuestFilter, QuestParticipant,
    QuestStats, QuestSummary,
};
use crate::repositories::DmProfileRepo;

/// Quest columns, unqualified.
const COLUMNS: &str = "id, name, description, status, level_bracket, quest_type, \
     start_date, end_date, created_at, updated_at";

/// Quest columns qualified with the `q` alias for joins.
const Q_COLUMNS: &str = "q.id, q.name, q.description, q.status, q.level_bracket, q.quest_type, \
     q.start_date, q.end_date, q.created_at, q.updated_at";

/// SQL expression resolving a DM's display name (`qd`/`dmp` aliases).
const DM_NAME_EXPR: &str = "COALESCE(dmp.preferred_dm_name, qd.username, 'User ' || qd.user_id)";

/// Default number of quests returned by [`QuestRepo::list`].
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// Hard upper bound on list size.
pub const MAX_LIST_LIMIT: i64 = 500;

/// Number of DMs returned by [`QuestRepo::dm_stats`].
pub const DM_STATS_LIMIT: i64 = 20;

/// Clamp a requested list size into `1..=MAX_LIST_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// Read-only quest queries plus DM renaming.
pub struct QuestRepo;

impl QuestRepo {
    /// Headline counts for the dashboard.
    pub async fn stats(pool: &PgPool) -> Result<QuestStats, sqlx::Error> {
        sqlx::query_as::<_, QuestStats>(
            "SELECT
                (SELECT COUNT(*) FROM quests) AS total_quests,
                (SELECT COUNT(*) FROM quests WHERE status = 'active') AS active_quests,
                (SELECT COUNT(*) FROM quests WHERE status = 'completed') AS completed_quests,
                (SELECT COUNT(DISTINCT character_id) FROM quest_participants) AS total_participants,
                (SELECT COUNT(DISTINCT user_id) FROM quest_dms) AS total_dms,
                COALESCE((
                    SELECT ROUND(AVG(participant_count)::numeric, 1)
                    FROM (
                        SELECT COUNT(*) AS participant_count
                        FROM quest_participants
                        GROUP BY quest_id
                    ) per_quest
                ), 0)::float8 AS avg_participants_per_quest",
        )
        .fetch_one(pool)
        .await
    }

    /// List quests, newest first, with participant counts and DM names.
    pub async fn list(pool: &PgPool, filter: &QuestFilter) -> Result<Vec<QuestSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {Q_COLUMNS},
                    COUNT(DISTINCT qp.character_id) AS participant_count,
                    COALESCE(
                        ARRAY_AGG(DISTINCT {DM_NAME_EXPR}) FILTER (WHERE qd.user_id IS NOT NULL),
                        '{{}}'
                    ) AS dm_usernames
             FROM quests q
             LEFT JOIN quest_participants qp ON q.id = qp.quest_id
             LEFT JOIN quest_dms qd ON q.id = qd.quest_id
             LEFT JOIN dm_profiles dmp ON qd.user_id = dmp.user_id
             WHERE ($1::text IS NULL OR q.status = $1)
               AND ($2::text IS NULL OR q.level_bracket = $2)
             GROUP BY q.id
             ORDER BY q.start_date DESC NULLS LAST, q.created_at DESC
             LIMIT $3"
        );
        sqlx::query_as::<_, QuestSummary>(&query)
            .bind(&filter.status)
            .bind(&filter.level_bracket)
            .bind(filter.limit)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Quest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quests WHERE id = $1");
        sqlx::query_as::<_, Quest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A quest with its participants and DMs (primary DM first).
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<QuestDetail>, sqlx::Error> {
        let Some(quest) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let participants = sqlx::query_as::<_, QuestParticipant>(
            "SELECT qp.quest_id, qp.character_id, c.name AS character_name, c.user_id,
                    qp.starting_level, qp.starting_xp, qp.joined_at
             FROM quest_participants qp
             JOIN characters c ON qp.character_id = c.id
             WHERE qp.quest_id = $1
             ORDER BY qp.joined_at",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        let dms_query = format!(
            "SELECT qd.quest_id, qd.user_id, {DM_NAME_EXPR} AS username,
                    qd.is_primary, qd.joined_at
             FROM quest_dms qd
             LEFT JOIN dm_profiles dmp ON qd.user_id = dmp.user_id
             WHERE qd.quest_id = $1
             ORDER BY qd.is_primary DESC, qd.joined_at"
        );
        let dms = sqlx::query_as::<_, QuestDm>(&dms_query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(Some(QuestDetail {
            quest,
            participants,
            dms,
        }))
    }

    /// Distinct level brackets, sorted.
    pub async fn level_brackets(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT DISTINCT level_bracket FROM quests ORDER BY level_bracket")
            .fetch_all(pool)
            .await
    }

    /// Distinct quest types, sorted.
    pub async fn quest_types(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT DISTINCT quest_type FROM quests ORDER BY quest_type")
            .fetch_all(pool)
            .await
    }

    /// DMs ranked by number of quests run.
    pub async fn dm_stats(pool: &PgPool) -> Result<Vec<DmStat>, sqlx::Error> {
        sqlx::query_as::<_, DmStat>(
            "SELECT qd.user_id,
                    COALESCE(MAX(dmp.preferred_dm_name), MAX(qd.username), 'User ' || qd.user_id)
                        AS username,
                    COUNT(DISTINCT qd.quest_id) AS quest_count,
                    SUM(CASE WHEN qd.is_primary THEN 1 ELSE 0 END) AS primary_dm_count
             FROM quest_dms qd
             LEFT JOIN dm_profiles dmp ON qd.user_id = dmp.user_id
             GROUP BY qd.user_id
             ORDER BY quest_count DESC, qd.user_id
             LIMIT $1",
        )
        .bind(DM_STATS_LIMIT)
        .fetch_all(pool)
        .await
    }

    /// Every quest a character has joined, newest first.
    pub async fn character_history(
        pool: &PgPool,
        character_id: DbId,
    ) -> Result<Vec<CharacterQuestEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {Q_COLUMNS}, qp.starting_level, qp.starting_xp, qp.joined_at
             FROM quests q
             JOIN quest_participants qp ON q.id = qp.quest_id
             WHERE qp.character_id = $1
             ORDER BY q.start_date DESC NULLS LAST, qp.joined_at DESC"
        );
        sqlx::query_as::<_, CharacterQuestEntry>(&query)
            .bind(character_id)
            .fetch_all(pool)
            .await
    }

    /// Set a DM's global display name and rewrite the stored name on all of
    /// their quest assignments, in one transaction.
    pub async fn rename_dm(
        pool: &PgPool,
        user_id: DiscordId,
        new_name: &str,
    ) -> Result<DmProfile, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let profile = DmProfileRepo::upsert(&mut *tx, user_id, new_name).await?;

        let renamed = sqlx::query("UPDATE quest_dms SET username = $1 WHERE user_id = $2")
            .bind(new_name)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        tracing::debug!(user_id, renamed, "Renamed DM across quest assignments");
        Ok(profile)
    }
}
