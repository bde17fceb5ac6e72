//! External delivery channels for level-up notifications.
//!
//! [`LevelUpDelivery`] is the seam the dispatcher talks to; the Discord
//! implementation lives in [`discord`] and the renderable content in
//! [`embed`].

pub mod discord;
pub mod embed;

use async_trait::async_trait;
use tavern_core::types::DiscordId;

use crate::bus::LevelUpNotice;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The target channel does not exist or the bot cannot see it.
    #[error("Channel {0} is not reachable")]
    ChannelUnavailable(DiscordId),

    /// The user cannot be messaged (DMs disabled, unknown user).
    #[error("User {0} cannot receive direct messages")]
    DirectMessageRefused(DiscordId),

    /// The Discord API rejected the request.
    #[error("Discord API error: {0}")]
    Discord(#[from] serenity::Error),

    /// A snowflake could not be converted to a Discord id.
    #[error("Invalid Discord id {0}")]
    InvalidId(DiscordId),
}

// ---------------------------------------------------------------------------
// LevelUpDelivery
// ---------------------------------------------------------------------------

/// Outbound notification transport.
#[async_trait]
pub trait LevelUpDelivery: Send + Sync {
    /// Post the level-up announcement to a guild channel.
    async fn post_to_channel(
        &self,
        channel_id: DiscordId,
        notice: &LevelUpNotice,
    ) -> Result<(), DeliveryError>;

    /// Send the level-up message to the character's owner.
    async fn direct_message(
        &self,
        owner_id: DiscordId,
        notice: &LevelUpNotice,
    ) -> Result<(), DeliveryError>;
}
