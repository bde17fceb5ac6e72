//! Per-guild RP XP configuration.
//!
//! Stored as a JSONB blob in `guild_configs.settings`. Every field has a
//! serde default so partially-populated blobs (and missing rows) resolve to
//! a usable configuration.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DiscordId;

/// Default number of typed characters required to earn 1 XP.
pub const DEFAULT_CHAR_PER_RP: i64 = 240;

/// Default maximum RP XP per character per day.
pub const DEFAULT_DAILY_RP_CAP: i64 = 5;

/// RP XP settings for a single guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildConfig {
    /// Channels in which messages earn RP XP.
    pub rp_channels: Vec<DiscordId>,
    /// Characters (Unicode scalar values) required to earn 1 XP.
    pub char_per_rp: i64,
    /// Maximum RP XP a character may earn per day.
    pub daily_rp_cap: i64,
    /// Channel that receives level-up announcements.
    pub log_channel_id: Option<DiscordId>,
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            rp_channels: Vec::new(),
            char_per_rp: DEFAULT_CHAR_PER_RP,
            daily_rp_cap: DEFAULT_DAILY_RP_CAP,
            log_channel_id: None,
        }
    }
}

impl GuildConfig {
    /// Whether messages in `channel_id` are eligible for RP XP.
    pub fn is_rp_channel(&self, channel_id: DiscordId) -> bool {
        self.rp_channels.contains(&channel_id)
    }

    /// Add or remove a channel from the RP set.
    ///
    /// Returns `true` if the set changed.
    pub fn set_rp_channel(&mut self, channel_id: DiscordId, enabled: bool) -> bool {
        let present = self.is_rp_channel(channel_id);
        match (enabled, present) {
            (true, false) => {
                self.rp_channels.push(channel_id);
                true
            }
            (false, true) => {
                self.rp_channels.retain(|c| *c != channel_id);
                true
            }
            _ => false,
        }
    }

    /// Reject a configuration the accrual path cannot divide by.
    pub fn ensure_accruable(&self) -> Result<(), CoreError> {
        if self.char_per_rp <= 0 {
            return Err(CoreError::Configuration(format!(
                "char_per_rp must be positive, got {}",
                self.char_per_rp
            )));
        }
        Ok(())
    }
}
