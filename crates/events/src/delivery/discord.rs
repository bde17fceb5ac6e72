//! Discord REST delivery of level-up notices.
//!
//! [`DiscordDelivery`] renders a [`LevelUpEmbed`] into a serenity
//! [`CreateEmbed`] and posts it over the bot's HTTP client. It holds its own
//! `Arc<Http>` so delivery does not depend on the gateway connection.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{ChannelId, Colour, CreateEmbed, CreateMessage, Http, Timestamp, UserId};
use serenity::http::HttpError;
use tavern_core::types::DiscordId;

use super::embed::{LevelUpEmbed, DEFAULT_CHARACTER_IMAGE};
use super::{DeliveryError, LevelUpDelivery};
use crate::bus::LevelUpNotice;

/// Posts level-up embeds through the Discord REST API.
pub struct DiscordDelivery {
    http: Arc<Http>,
    default_image: String,
}

impl DiscordDelivery {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            default_image: DEFAULT_CHARACTER_IMAGE.to_string(),
        }
    }

    /// Override the thumbnail used for characters without an image.
    pub fn with_default_image(mut self, url: impl Into<String>) -> Self {
        self.default_image = url.into();
        self
    }

    fn message(embed: LevelUpEmbed, notice: &LevelUpNotice) -> CreateMessage {
        let timestamp = Timestamp::from_unix_timestamp(notice.timestamp.timestamp())
            .unwrap_or_else(|_| Timestamp::now());

        let mut builder = CreateEmbed::new()
            .title(embed.title)
            .description(embed.description)
            .colour(Colour::GOLD)
            .timestamp(timestamp)
            .thumbnail(embed.thumbnail_url);
        for field in embed.fields {
            builder = builder.field(field.name, field.value, field.inline);
        }

        CreateMessage::new().embed(builder)
    }
}

#[async_trait]
impl LevelUpDelivery for DiscordDelivery {
    async fn post_to_channel(
        &self,
        channel_id: DiscordId,
        notice: &LevelUpNotice,
    ) -> Result<(), DeliveryError> {
        let channel = ChannelId::new(snowflake(channel_id)?);
        let message = Self::message(LevelUpEmbed::for_channel(notice, &self.default_image), notice);

        channel
            .send_message(&*self.http, message)
            .await
            .map_err(|e| match status_of(&e) {
                Some(403 | 404) => DeliveryError::ChannelUnavailable(channel_id),
                _ => DeliveryError::Discord(e),
            })?;
        Ok(())
    }

    async fn direct_message(
        &self,
        owner_id: DiscordId,
        notice: &LevelUpNotice,
    ) -> Result<(), DeliveryError> {
        let user = UserId::new(snowflake(owner_id)?);
        let message = Self::message(LevelUpEmbed::for_owner(notice, &self.default_image), notice);

        user.direct_message(&*self.http, message)
            .await
            .map_err(|e| match status_of(&e) {
                Some(403 | 404) => DeliveryError::DirectMessageRefused(owner_id),
                _ => DeliveryError::Discord(e),
            })?;
        Ok(())
    }
}

/// Discord ids are non-zero unsigned snowflakes.
fn snowflake(id: DiscordId) -> Result<u64, DeliveryError> {
    match u64::try_from(id) {
        Ok(value) if value != 0 => Ok(value),
        _ => Err(DeliveryError::InvalidId(id)),
    }
}

fn status_of(error: &serenity::Error) -> Option<u16> {
    match error {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            Some(response.status_code.as_u16())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn snowflake_rejects_zero_and_negative() {
        assert_eq!(snowflake(123).unwrap(), 123);
        assert_matches!(snowflake(0), Err(DeliveryError::InvalidId(0)));
        assert_matches!(snowflake(-5), Err(DeliveryError::InvalidId(-5)));
    }
}
