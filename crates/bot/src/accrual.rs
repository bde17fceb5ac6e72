//! Message accrual orchestrator.
//!
//! Turns one inbound chat message into at most one XP award:
//!
//! 1. Skip bot authors and messages outside the guild's RP channels.
//! 2. Ensure the author has a ledger entry.
//! 3. Under the author's lock: take the timestamp, load the active
//!    character, roll over the daily cap if a later day has begun, plan the
//!    accrual, and commit it with a guarded write. A lost guard re-reads and retries.
//! 4. After the lock is released: publish a [`LevelUpNotice`] if the award
//!    crossed a level.
//!
//! Storage failures propagate to the caller. Notification delivery happens
//! on the event bus and can never fail or roll back an award.

use std::sync::Arc;

use chrono::Utc;
use tavern_core::cap_policy::{perform_reset, plan_accrual, rp_length, DayBoundary, LedgerWrite};
use tavern_core::guild_config::GuildConfig;
use tavern_core::leveling::XpAwardResult;
use tavern_core::types::{DiscordId, Timestamp};
use tavern_db::models::character::Character;
use tavern_events::{EventBus, LevelUpNotice};

use crate::ledger::{LedgerError, XpLedger};
use crate::locks::OwnerLocks;

/// Attempts at a guarded write before giving up on a message.
pub const MAX_ATTEMPTS: usize = 3;

/// Source of the accrual timestamp. Read only once the owner lock is held.
pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The parts of a chat message the accrual path reads.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub guild_id: DiscordId,
    pub channel_id: DiscordId,
    pub author_id: DiscordId,
    pub author_is_bot: bool,
    pub content: String,
}

/// Why a message produced no ledger activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    BotAuthor,
    NotRpChannel,
    NoActiveCharacter,
}

/// What processing a message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Ignored(IgnoreReason),
    /// The guild's `char_per_rp` is unusable; the message was skipped.
    Misconfigured,
    /// The message neither earned XP nor moved the buffer.
    Unchanged,
    Buffered {
        character: String,
        new_buffer: i64,
    },
    Awarded {
        character: String,
        gained_xp: i64,
        award: XpAwardResult,
    },
}

// ---------------------------------------------------------------------------
// AccrualOrchestrator
// ---------------------------------------------------------------------------

pub struct AccrualOrchestrator {
    ledger: Arc<dyn XpLedger>,
    bus: Arc<EventBus>,
    boundary: DayBoundary,
    locks: OwnerLocks,
    clock: Clock,
}

impl AccrualOrchestrator {
    pub fn new(ledger: Arc<dyn XpLedger>, bus: Arc<EventBus>, boundary: DayBoundary) -> Self {
        Self {
            ledger,
            bus,
            boundary,
            locks: OwnerLocks::new(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock used by [`handle_message`](Self::handle_message).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Process one message, stamped when its owner's lock is acquired.
    ///
    /// Messages from one owner can reach the lock out of arrival order, so
    /// the timestamp is taken under the lock to keep it monotonic per owner.
    pub async fn handle_message(
        &self,
        message: &InboundMessage,
    ) -> Result<MessageOutcome, LedgerError> {
        self.process(message, &*self.clock).await
    }

    /// Process one message as if received at `now`.
    pub async fn handle_message_at(
        &self,
        message: &InboundMessage,
        now: Timestamp,
    ) -> Result<MessageOutcome, LedgerError> {
        self.process(message, &move || now).await
    }

    async fn process(
        &self,
        message: &InboundMessage,
        clock: &(dyn Fn() -> Timestamp + Send + Sync),
    ) -> Result<MessageOutcome, LedgerError> {
        if message.author_is_bot {
            return Ok(MessageOutcome::Ignored(IgnoreReason::BotAuthor));
        }

        let config = self.ledger.get_config(message.guild_id).await?;
        if !config.is_rp_channel(message.channel_id) {
            return Ok(MessageOutcome::Ignored(IgnoreReason::NotRpChannel));
        }
        if let Err(e) = config.ensure_accruable() {
            tracing::error!(
                guild_id = message.guild_id,
                error = %e,
                "Skipping RP message, guild XP configuration is unusable"
            );
            return Ok(MessageOutcome::Misconfigured);
        }

        self.ledger.ensure_ledger_entry(message.author_id).await?;

        let message_len = rp_length(&message.content);
        let outcome = {
            let _guard = self.locks.lock(message.author_id).await;
            let now = clock();
            self.accrue(message.author_id, message_len, &config, now)
                .await?
        };

        if let MessageOutcome::Awarded {
            character, award, ..
        } = &outcome
        {
            tracing::info!(
                user_id = message.author_id,
                character = %character,
                new_total_xp = award.new_total_xp,
                leveled_up = award.leveled_up,
                "Awarded RP XP"
            );
            if award.leveled_up {
                self.publish_level_up(message, character, award).await;
            }
        }

        Ok(outcome)
    }

    /// One guarded read-plan-write cycle, retried on lost guards.
    async fn accrue(
        &self,
        owner_id: DiscordId,
        message_len: i64,
        config: &GuildConfig,
        now: Timestamp,
    ) -> Result<MessageOutcome, LedgerError> {
        let mut last_name = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            let Some(active) = self.ledger.get_active_character(owner_id).await? else {
                return Ok(MessageOutcome::Ignored(IgnoreReason::NoActiveCharacter));
            };
            let name = active.name.clone();

            let mut state = active.daily_state();
            if self.boundary.should_reset(state.last_reset_at, now) {
                let reset = self
                    .ledger
                    .reset_daily(owner_id, &name, state.last_reset_at, now)
                    .await?;
                if !reset {
                    tracing::debug!(user_id = owner_id, attempt, "Daily reset raced, re-reading");
                    last_name = name;
                    continue;
                }
                tracing::debug!(user_id = owner_id, character = %name, "Daily RP XP reset");
                state = perform_reset(state, now);
            }

            let plan = match plan_accrual(&state, message_len, config) {
                Ok(plan) => plan,
                Err(e) => {
                    tracing::error!(user_id = owner_id, error = %e, "Accrual planning failed");
                    return Ok(MessageOutcome::Misconfigured);
                }
            };
            if plan.forfeited_xp() > 0 {
                tracing::debug!(
                    user_id = owner_id,
                    character = %name,
                    forfeited_xp = plan.forfeited_xp(),
                    "Daily RP XP cap reached"
                );
            }

            let committed = match plan.write() {
                LedgerWrite::Nothing => return Ok(MessageOutcome::Unchanged),
                LedgerWrite::BufferOnly { new_buffer } => self
                    .ledger
                    .update_character_buffer(owner_id, &name, state.char_buffer, new_buffer)
                    .await
                    .map(|()| MessageOutcome::Buffered {
                        character: name.clone(),
                        new_buffer,
                    }),
                LedgerWrite::Award(delta) => self
                    .ledger
                    .award_xp(owner_id, &name, &delta, &state.guard())
                    .await
                    .map(|award| MessageOutcome::Awarded {
                        character: name.clone(),
                        gained_xp: plan.gained_xp,
                        award,
                    }),
            };

            match committed {
                Err(LedgerError::Conflict { .. }) => {
                    tracing::debug!(user_id = owner_id, attempt, "Ledger write raced, retrying");
                    last_name = name;
                }
                other => return other,
            }
        }

        tracing::warn!(
            user_id = owner_id,
            attempts = MAX_ATTEMPTS,
            "Giving up on RP message after repeated concurrent updates"
        );
        Err(LedgerError::Conflict {
            owner_id,
            name: last_name,
        })
    }

    /// Build and publish the level-up notice. Lookup failures degrade the
    /// notice rather than failing the message.
    async fn publish_level_up(
        &self,
        message: &InboundMessage,
        character_name: &str,
        award: &XpAwardResult,
    ) {
        let character: Option<Character> = match self
            .ledger
            .get_character(message.author_id, character_name)
            .await
        {
            Ok(character) => Some(character),
            Err(e) => {
                tracing::warn!(
                    user_id = message.author_id,
                    error = %e,
                    "Could not load character for level-up notice"
                );
                None
            }
        };

        let log_channel = match self.ledger.get_log_channel_id(message.guild_id).await {
            Ok(channel) => channel,
            Err(e) => {
                tracing::warn!(
                    guild_id = message.guild_id,
                    error = %e,
                    "Could not load log channel for level-up notice"
                );
                None
            }
        };

        let (sheet_url, image_url) = character
            .map(|c| (c.character_sheet_url, c.image_url))
            .unwrap_or_default();

        let notice = LevelUpNotice::new(message.guild_id, message.author_id, character_name, award)
            .with_sheet_url(sheet_url)
            .with_image_url(image_url)
            .with_log_channel(log_channel);

        tracing::info!(
            user_id = message.author_id,
            character = %character_name,
            old_level = award.old_level,
            new_level = award.new_level,
            "Character leveled up from RP"
        );
        self.bus.publish(notice);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
