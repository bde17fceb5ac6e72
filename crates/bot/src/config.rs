use std::time::Duration;

use tavern_core::cap_policy::DayBoundary;
use tavern_core::leveling::LevelTable;
use tavern_core::types::DiscordId;
use tavern_events::delivery::embed::DEFAULT_CHARACTER_IMAGE;

/// Bot configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub database_url: String,
    /// Deployment environment; `dev` syncs commands to [`Self::guild_id`] only.
    pub env: String,
    /// Guild targeted by development command sync.
    pub guild_id: Option<DiscordId>,
    /// Reference zone for the daily cap rollover.
    pub day_boundary: DayBoundary,
    pub levels: LevelTable,
    /// Bound on each level-up notification delivery.
    pub notify_timeout: Duration,
    /// Thumbnail for characters without an image.
    pub default_character_image: String,
}

impl BotConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default          |
    /// |----------------------------------|------------------|
    /// | `DISCORD_TOKEN`                  | required         |
    /// | `DATABASE_URL`                   | required         |
    /// | `ENV`                            | `prod`           |
    /// | `GUILD_ID`                       | none             |
    /// | `DAILY_RESET_UTC_OFFSET_MINUTES` | `0`              |
    /// | `LEVEL_THRESHOLDS`               | D&D 5e table     |
    /// | `NOTIFY_TIMEOUT_SECS`            | `10`             |
    /// | `DEFAULT_CHARACTER_IMAGE`        | Discord avatar   |
    ///
    /// Panics on missing required values or malformed input.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN").expect("DISCORD_TOKEN must be set");
        let database_url = lookup("DATABASE_URL").expect("DATABASE_URL must be set");

        let env = lookup("ENV").unwrap_or_else(|| "prod".into());

        let guild_id = lookup("GUILD_ID")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse::<DiscordId>()
                    .expect("GUILD_ID must be a valid Discord id")
            });

        let offset_minutes: i32 = lookup("DAILY_RESET_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|| "0".into())
            .parse()
            .expect("DAILY_RESET_UTC_OFFSET_MINUTES must be a valid i32");
        let day_boundary = DayBoundary::from_offset_minutes(offset_minutes)
            .unwrap_or_else(|e| panic!("Invalid DAILY_RESET_UTC_OFFSET_MINUTES: {e}"));

        let levels = match lookup("LEVEL_THRESHOLDS") {
            Some(raw) if !raw.trim().is_empty() => LevelTable::parse(&raw)
                .unwrap_or_else(|e| panic!("Invalid LEVEL_THRESHOLDS: {e}")),
            _ => LevelTable::default(),
        };

        let notify_timeout_secs: u64 = lookup("NOTIFY_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".into())
            .parse()
            .expect("NOTIFY_TIMEOUT_SECS must be a valid u64");

        let default_character_image = lookup("DEFAULT_CHARACTER_IMAGE")
            .unwrap_or_else(|| DEFAULT_CHARACTER_IMAGE.into());

        Self {
            discord_token,
            database_url,
            env,
            guild_id,
            day_boundary,
            levels,
            notify_timeout: Duration::from_secs(notify_timeout_secs),
            default_character_image,
        }
    }

    pub fn is_dev(&self) -> bool {
        self.env.eq_ignore_ascii_case("dev")
    }
}
