//! Slash commands.
//!
//! Each command is a plain async function taking a [`CommandContext`], the
//! [`Invocation`] and parsed [`CommandArgs`], returning a [`Reply`].
//! [`definitions`] lists what is registered with Discord and [`dispatch`]
//! routes by command name.

pub mod character;
pub mod dm_profile;
pub mod options;
pub mod settings;

use std::sync::Arc;

use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption, Permissions};
use tavern_core::cap_policy::DayBoundary;
use tavern_core::leveling::LevelTable;
use tavern_core::types::DiscordId;
use tavern_db::DbPool;

use crate::error::BotError;
pub use options::{ArgValue, CommandArgs};

/// Shared dependencies for command handlers.
#[derive(Clone)]
pub struct CommandContext {
    pub pool: DbPool,
    pub levels: Arc<LevelTable>,
    pub boundary: DayBoundary,
}

/// Who invoked a command, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    pub user_id: DiscordId,
    pub guild_id: Option<DiscordId>,
}

impl Invocation {
    pub fn require_guild(&self) -> Result<DiscordId, BotError> {
        self.guild_id.ok_or(BotError::GuildOnly)
    }
}

/// Response text for an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Only visible to the invoking user.
    pub ephemeral: bool,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn private(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Every slash command the bot registers.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(dm_profile::SET)
            .description("Set the name shown for you as a DM")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "Your DM display name")
                    .required(true),
            ),
        CreateCommand::new(dm_profile::VIEW).description("Show your DM display name"),
        CreateCommand::new(settings::RP_SETTINGS)
            .description("Configure how roleplay earns XP")
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "char_per_rp",
                    "Characters (Unicode scalar values) typed per 1 XP",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "daily_rp_cap",
                    "Maximum roleplay XP per character per day",
                )
                .required(true),
            ),
        CreateCommand::new(settings::RP_CHANNEL)
            .description("Enable or disable roleplay XP in a channel")
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(
                CreateCommandOption::new(CommandOptionType::Channel, "channel", "Channel")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Boolean,
                    "enabled",
                    "Whether messages there earn XP",
                )
                .required(true),
            ),
        CreateCommand::new(settings::LOG_CHANNEL)
            .description("Set or clear the level-up announcement channel")
            .default_member_permissions(Permissions::MANAGE_GUILD)
            .add_option(CreateCommandOption::new(
                CommandOptionType::Channel,
                "channel",
                "Announcement channel; omit to disable",
            )),
        CreateCommand::new(character::CREATE)
            .description("Create a character")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "Character name")
                    .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "sheet_url",
                "Link to the character sheet",
            ))
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "image_url",
                "Character portrait URL",
            )),
        CreateCommand::new(character::ACTIVATE)
            .description("Choose which character earns roleplay XP")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "Character name")
                    .required(true),
            ),
        CreateCommand::new(character::INFO).description("Show your active character's progress"),
    ]
}

/// Names of every registered command, for logging.
pub const NAMES: [&str; 8] = [
    dm_profile::SET,
    dm_profile::VIEW,
    settings::RP_SETTINGS,
    settings::RP_CHANNEL,
    settings::LOG_CHANNEL,
    character::CREATE,
    character::ACTIVATE,
    character::INFO,
];

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run the named command. Errors become user-facing replies; internal
/// errors are logged.
pub async fn dispatch(
    ctx: &CommandContext,
    name: &str,
    invocation: Invocation,
    args: &CommandArgs,
) -> Reply {
    let result = match name {
        dm_profile::SET => dm_profile::set(ctx, invocation, args).await,
        dm_profile::VIEW => dm_profile::view(ctx, invocation).await,
        settings::RP_SETTINGS => settings::rp_settings(ctx, invocation, args).await,
        settings::RP_CHANNEL => settings::rp_channel(ctx, invocation, args).await,
        settings::LOG_CHANNEL => settings::log_channel(ctx, invocation, args).await,
        character::CREATE => character::create(ctx, invocation, args).await,
        character::ACTIVATE => character::activate(ctx, invocation, args).await,
        character::INFO => character::info(ctx, invocation).await,
        other => {
            tracing::warn!(command = other, "Received unknown command");
            return Reply::private("Unknown command.");
        }
    };

    result.unwrap_or_else(|e| {
        if e.is_internal() {
            tracing::error!(command = name, user_id = invocation.user_id, error = %e, "Command failed");
        } else {
            tracing::debug!(command = name, user_id = invocation.user_id, error = %e, "Command rejected");
        }
        Reply::private(e.user_message())
    })
}
