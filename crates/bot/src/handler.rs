//! Serenity gateway event handler.
//!
//! Bridges Discord events to the accrual orchestrator and the slash-command
//! dispatcher. Nothing here holds domain logic.

use std::sync::Arc;

use serenity::all::{
    Command, CommandInteraction, Context, CreateInteractionResponse,
    CreateInteractionResponseMessage, EventHandler, GuildId, Interaction, Message, Ready,
};
use serenity::async_trait;
use tavern_core::types::DiscordId;

use crate::accrual::{AccrualOrchestrator, InboundMessage, MessageOutcome};
use crate::commands::{self, CommandArgs, CommandContext, Invocation};

/// Discord snowflakes occupy at most 63 bits.
fn db_id(id: u64) -> DiscordId {
    id as DiscordId
}

/// How slash commands are registered on startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSync {
    /// Register on one guild only (instant updates while developing).
    Guild(u64),
    /// Register globally, clearing any guild-specific copies first.
    Global { clear_guild: Option<u64> },
}

impl CommandSync {
    pub fn from_env(is_dev: bool, guild_id: Option<DiscordId>) -> Self {
        let guild = guild_id.and_then(|id| u64::try_from(id).ok()).filter(|id| *id != 0);
        match (is_dev, guild) {
            (true, Some(guild)) => CommandSync::Guild(guild),
            (_, clear_guild) => CommandSync::Global { clear_guild },
        }
    }
}

pub struct Handler {
    orchestrator: Arc<AccrualOrchestrator>,
    commands: CommandContext,
    sync: CommandSync,
}

impl Handler {
    pub fn new(
        orchestrator: Arc<AccrualOrchestrator>,
        commands: CommandContext,
        sync: CommandSync,
    ) -> Self {
        Self {
            orchestrator,
            commands,
            sync,
        }
    }

    async fn sync_commands(&self, ctx: &Context) -> Result<(), serenity::Error> {
        match self.sync {
            CommandSync::Guild(guild) => {
                let registered = GuildId::new(guild)
                    .set_commands(&ctx.http, commands::definitions())
                    .await?;
                tracing::info!(
                    guild_id = guild,
                    count = registered.len(),
                    commands = ?commands::NAMES,
                    "Synced slash commands to development guild"
                );
            }
            CommandSync::Global { clear_guild } => {
                if let Some(guild) = clear_guild {
                    GuildId::new(guild).set_commands(&ctx.http, Vec::new()).await?;
                    tracing::debug!(guild_id = guild, "Cleared guild-specific slash commands");
                }
                let registered =
                    Command::set_global_commands(&ctx.http, commands::definitions()).await?;
                tracing::info!(
                    count = registered.len(),
                    commands = ?commands::NAMES,
                    "Synced slash commands globally"
                );
            }
        }
        Ok(())
    }

    async fn run_command(&self, ctx: &Context, command: &CommandInteraction) {
        let invocation = Invocation {
            user_id: db_id(command.user.id.get()),
            guild_id: command.guild_id.map(|id| db_id(id.get())),
        };
        let args = CommandArgs::from_resolved(&command.data.options());
        let reply =
            commands::dispatch(&self.commands, &command.data.name, invocation, &args).await;

        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(reply.content)
                .ephemeral(reply.ephemeral),
        );
        if let Err(e) = command.create_response(&ctx.http, response).await {
            tracing::error!(
                command = %command.data.name,
                error = %e,
                "Failed to respond to slash command"
            );
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(user = %ready.user.name, guilds = ready.guilds.len(), "Connected to Discord");
        if let Err(e) = self.sync_commands(&ctx).await {
            tracing::error!(error = %e, "Failed to sync slash commands");
        }
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        let inbound = InboundMessage {
            guild_id: db_id(guild_id.get()),
            channel_id: db_id(msg.channel_id.get()),
            author_id: db_id(msg.author.id.get()),
            author_is_bot: msg.author.bot,
            content: msg.content,
        };

        match self.orchestrator.handle_message(&inbound).await {
            Ok(MessageOutcome::Ignored(_)) | Ok(MessageOutcome::Unchanged) => {}
            Ok(outcome) => {
                tracing::debug!(user_id = inbound.author_id, ?outcome, "Processed RP message");
            }
            Err(e) => {
                tracing::error!(
                    guild_id = inbound.guild_id,
                    channel_id = inbound.channel_id,
                    user_id = inbound.author_id,
                    error = %e,
                    "Failed to process RP message"
                );
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.run_command(&ctx, &command).await;
        }
    }
}
