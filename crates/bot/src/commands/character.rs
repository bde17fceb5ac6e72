//! `/character_create`, `/character_activate` and `/character_info`.

use chrono::Utc;
use tavern_core::cap_policy::DayBoundary;
use tavern_core::error::CoreError;
use tavern_core::guild_config::GuildConfig;
use tavern_core::leveling::LevelTable;
use tavern_core::types::Timestamp;
use tavern_core::validation::{normalize_character_name, validate_optional_url};
use tavern_db::models::character::{Character, CreateCharacter};
use tavern_db::repositories::{CharacterRepo, GuildConfigRepo, UserRepo};

use super::{CommandArgs, CommandContext, Invocation, Reply};
use crate::error::BotError;

pub const CREATE: &str = "character_create";
pub const ACTIVATE: &str = "character_activate";
pub const INFO: &str = "character_info";

/// Width of the text progress bar in `/character_info`.
const PROGRESS_BAR_WIDTH: usize = 20;

pub async fn create(
    ctx: &CommandContext,
    invocation: Invocation,
    args: &CommandArgs,
) -> Result<Reply, BotError> {
    let name = normalize_character_name(args.required_str("name")?)?;
    let sheet_url = non_blank(args.str("sheet_url"));
    let image_url = non_blank(args.str("image_url"));
    validate_optional_url(sheet_url.as_deref(), "Character sheet URL")?;
    validate_optional_url(image_url.as_deref(), "Image URL")?;

    UserRepo::ensure(&ctx.pool, invocation.user_id).await?;
    if CharacterRepo::find_by_name(&ctx.pool, invocation.user_id, &name)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict(format!("You already have a character named '{name}'")).into());
    }

    let character = CharacterRepo::create(
        &ctx.pool,
        &CreateCharacter {
            user_id: invocation.user_id,
            name,
            character_sheet_url: sheet_url,
            image_url,
        },
    )
    .await
    .map_err(|e| {
        if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
            BotError::from(CoreError::Conflict(
                "You already have a character with that name".into(),
            ))
        } else {
            BotError::from(e)
        }
    })?;

    tracing::info!(user_id = invocation.user_id, character = %character.name, "Character created");
    let suffix = if character.is_active {
        " It is now your active character."
    } else {
        ""
    };
    Ok(Reply::private(format!(
        "Created **{}**.{suffix}",
        character.name
    )))
}

pub async fn activate(
    ctx: &CommandContext,
    invocation: Invocation,
    args: &CommandArgs,
) -> Result<Reply, BotError> {
    let name = args.required_str("name")?.trim();
    let character = CharacterRepo::activate(&ctx.pool, invocation.user_id, name)
        .await?
        .ok_or_else(|| BotError::UnknownCharacter(name.to_string()))?;

    tracing::info!(user_id = invocation.user_id, character = %character.name, "Active character changed");
    Ok(Reply::private(format!(
        "**{}** is now your active character and will earn roleplay XP.",
        character.name
    )))
}

pub async fn info(ctx: &CommandContext, invocation: Invocation) -> Result<Reply, BotError> {
    let Some(character) = CharacterRepo::find_active(&ctx.pool, invocation.user_id).await? else {
        return Ok(Reply::private(format!(
            "You have no active character. Use `/{CREATE}` or `/{ACTIVATE}` first."
        )));
    };

    let config = match invocation.guild_id {
        Some(guild_id) => GuildConfigRepo::get(&ctx.pool, guild_id).await?,
        None => GuildConfig::default(),
    };

    Ok(Reply::private(render_info(
        &character,
        &ctx.levels,
        &config,
        ctx.boundary,
        Utc::now(),
    )))
}

/// Text body of `/character_info`.
pub fn render_info(
    character: &Character,
    levels: &LevelTable,
    config: &GuildConfig,
    boundary: DayBoundary,
    now: Timestamp,
) -> String {
    let progress = levels.resolve(character.total_xp);

    // A stale daily counter has not been reset yet; it will be on the next
    // RP message.
    let today = if boundary.should_reset(character.last_reset_at, now) {
        0
    } else {
        character.daily_xp
    };

    let next = match progress.next_threshold {
        Some(next) => format!(
            "{} {:.0}% ({} / {} XP)",
            progress_bar(progress.progress),
            progress.progress * 100.0,
            character.total_xp,
            next
        ),
        None => "Maximum level reached".to_string(),
    };

    let mut lines = vec![
        format!("**{}** - Level {}", character.name, progress.level),
        format!("Total XP: {}", character.total_xp),
        format!("Next level: {next}"),
        format!("Roleplay XP today: {today} / {}", config.daily_rp_cap),
    ];
    if let Some(url) = &character.character_sheet_url {
        lines.push(format!("Character sheet: {url}"));
    }
    lines.join("\n")
}

fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * PROGRESS_BAR_WIDTH as f64).floor()) as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
