//! Guild configuration commands: `/rp_settings`, `/rp_channel`,
//! `/log_channel`.
//!
//! Access is gated by the `MANAGE_GUILD` default permission set at
//! registration.

use tavern_core::guild_config::GuildConfig;
use tavern_core::validation::{validate_char_per_rp, validate_daily_rp_cap};
use tavern_db::repositories::GuildConfigRepo;

use super::{CommandArgs, CommandContext, Invocation, Reply};
use crate::error::BotError;

pub const RP_SETTINGS: &str = "rp_settings";
pub const RP_CHANNEL: &str = "rp_channel";
pub const LOG_CHANNEL: &str = "log_channel";

pub async fn rp_settings(
    ctx: &CommandContext,
    invocation: Invocation,
    args: &CommandArgs,
) -> Result<Reply, BotError> {
    let guild_id = invocation.require_guild()?;
    let char_per_rp = args.required_int("char_per_rp")?;
    let daily_rp_cap = args.required_int("daily_rp_cap")?;
    validate_char_per_rp(char_per_rp)?;
    validate_daily_rp_cap(daily_rp_cap)?;

    let config = GuildConfigRepo::update(&ctx.pool, guild_id, |c| {
        c.char_per_rp = char_per_rp;
        c.daily_rp_cap = daily_rp_cap;
    })
    .await?;

    tracing::info!(guild_id, char_per_rp, daily_rp_cap, "RP settings updated");
    Ok(Reply::private(summarize(&config)))
}

pub async fn rp_channel(
    ctx: &CommandContext,
    invocation: Invocation,
    args: &CommandArgs,
) -> Result<Reply, BotError> {
    let guild_id = invocation.require_guild()?;
    let channel_id = args.required_channel("channel")?;
    let enabled = args.required_bool("enabled")?;

    let mut changed = false;
    GuildConfigRepo::update(&ctx.pool, guild_id, |c| {
        changed = c.set_rp_channel(channel_id, enabled);
    })
    .await?;

    tracing::info!(guild_id, channel_id, enabled, changed, "RP channel toggled");
    Ok(Reply::private(channel_toggle_message(channel_id, enabled, changed)))
}

pub async fn log_channel(
    ctx: &CommandContext,
    invocation: Invocation,
    args: &CommandArgs,
) -> Result<Reply, BotError> {
    let guild_id = invocation.require_guild()?;
    let channel_id = args.channel("channel");

    GuildConfigRepo::update(&ctx.pool, guild_id, |c| {
        c.log_channel_id = channel_id;
    })
    .await?;

    tracing::info!(guild_id, channel_id, "Level-up log channel updated");
    Ok(Reply::private(match channel_id {
        Some(id) => format!("Level-up announcements will be posted in <#{id}>."),
        None => "Level-up announcements are disabled.".to_string(),
    }))
}

fn channel_toggle_message(channel_id: i64, enabled: bool, changed: bool) -> String {
    match (enabled, changed) {
        (true, true) => format!("Messages in <#{channel_id}> now earn roleplay XP."),
        (true, false) => format!("<#{channel_id}> already earns roleplay XP."),
        (false, true) => format!("Messages in <#{channel_id}> no longer earn roleplay XP."),
        (false, false) => format!("<#{channel_id}> was not an RP channel."),
    }
}

/// Human-readable summary of a guild's RP settings.
pub fn summarize(config: &GuildConfig) -> String {
    let channels = if config.rp_channels.is_empty() {
        "none".to_string()
    } else {
        config
            .rp_channels
            .iter()
            .map(|id| format!("<#{id}>"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "RP settings updated: **{}** characters per XP, up to **{}** XP per day.\nRP channels: {channels}",
        config.char_per_rp, config.daily_rp_cap
    )
}
