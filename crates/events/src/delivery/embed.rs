//! Transport-independent content of the level-up embeds.
//!
//! [`LevelUpEmbed`] holds the rendered title, description, fields and
//! thumbnail so the wording can be tested without a Discord client. The
//! channel announcement and the owner DM differ slightly: the DM carries the
//! new total XP and folds the sheet link into the reminder.

use crate::bus::LevelUpNotice;

/// Thumbnail used when a character has no image.
pub const DEFAULT_CHARACTER_IMAGE: &str = "https://cdn.discordapp.com/embed/avatars/0.png";

const SOURCE_LABEL: &str = "Roleplay Activity";
const REMINDER: &str = "Please update your character sheet to reflect your new level!";

/// One embed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: format!("**{name}**"),
            value: value.into(),
            inline,
        }
    }
}

/// Rendered level-up embed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpEmbed {
    pub title: String,
    pub description: String,
    pub fields: Vec<EmbedField>,
    pub thumbnail_url: String,
}

impl LevelUpEmbed {
    /// The announcement posted to the guild log channel.
    pub fn for_channel(notice: &LevelUpNotice, default_image: &str) -> Self {
        let mut fields = vec![
            EmbedField::new("Player", mention(notice), true),
            EmbedField::new("Old Level", notice.old_level.to_string(), true),
            EmbedField::new("New Level", notice.new_level.to_string(), true),
            EmbedField::new("Source", SOURCE_LABEL, false),
        ];
        if let Some(url) = &notice.character_sheet_url {
            fields.push(EmbedField::new("Character Sheet", format!("[View Sheet]({url})"), false));
        }
        fields.push(EmbedField::new("Action Required", REMINDER, false));

        Self::with_fields(notice, fields, default_image)
    }

    /// The message sent to the character's owner.
    pub fn for_owner(notice: &LevelUpNotice, default_image: &str) -> Self {
        let reminder = match &notice.character_sheet_url {
            Some(url) => format!(
                "Please update your [character sheet]({url}) to reflect your new level!"
            ),
            None => REMINDER.to_string(),
        };

        let fields = vec![
            EmbedField::new("Player", mention(notice), false),
            EmbedField::new("Old Level", notice.old_level.to_string(), true),
            EmbedField::new("New Level", notice.new_level.to_string(), true),
            EmbedField::new("New Total XP", format_thousands(notice.new_total_xp), false),
            EmbedField::new("Source", SOURCE_LABEL, false),
            EmbedField::new("Action Required", reminder, false),
        ];

        Self::with_fields(notice, fields, default_image)
    }

    fn with_fields(notice: &LevelUpNotice, fields: Vec<EmbedField>, default_image: &str) -> Self {
        let name = &notice.character_name;
        Self {
            title: format!("\u{1F389} Level Up! - {name}"),
            description: format!(
                "**{name}** has leveled up from **Level {}** to **Level {}**!",
                notice.old_level, notice.new_level
            ),
            fields,
            thumbnail_url: notice
                .image_url
                .clone()
                .unwrap_or_else(|| default_image.to_string()),
        }
    }
}

fn mention(notice: &LevelUpNotice) -> String {
    format!("<@{}>", notice.owner_id)
}

/// Format an integer with comma thousands separators (`12345` -> `12,345`).
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tavern_core::leveling::XpAwardResult;

    fn notice(sheet: Option<&str>, image: Option<&str>) -> LevelUpNotice {
        LevelUpNotice::new(
            1,
            42,
            "Aria",
            &XpAwardResult {
                old_level: 4,
                new_level: 5,
                new_total_xp: 6_500,
                leveled_up: true,
            },
        )
        .with_sheet_url(sheet.map(String::from))
        .with_image_url(image.map(String::from))
    }

    fn field<'a>(embed: &'a LevelUpEmbed, name: &str) -> Option<&'a EmbedField> {
        let wanted = format!("**{name}**");
        embed.fields.iter().find(|f| f.name == wanted)
    }

    // -----------------------------------------------------------------------
    // format_thousands
    // -----------------------------------------------------------------------

    #[test]
    fn thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(355_000), "355,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
        assert_eq!(format_thousands(-12_345), "-12,345");
    }

    // -----------------------------------------------------------------------
    // Channel announcement
    // -----------------------------------------------------------------------

    #[test]
    fn channel_embed_names_character_and_levels() {
        let embed = LevelUpEmbed::for_channel(&notice(None, None), DEFAULT_CHARACTER_IMAGE);
        assert!(embed.title.ends_with("Level Up! - Aria"));
        assert_eq!(
            embed.description,
            "**Aria** has leveled up from **Level 4** to **Level 5**!"
        );
        assert_eq!(field(&embed, "Player").unwrap().value, "<@42>");
        assert_eq!(field(&embed, "Old Level").unwrap().value, "4");
        assert_eq!(field(&embed, "New Level").unwrap().value, "5");
        assert_eq!(field(&embed, "Source").unwrap().value, "Roleplay Activity");
        assert!(field(&embed, "Character Sheet").is_none());
        assert!(field(&embed, "New Total XP").is_none());
        assert_eq!(embed.thumbnail_url, DEFAULT_CHARACTER_IMAGE);
    }

    #[test]
    fn channel_embed_links_sheet_when_present() {
        let embed = LevelUpEmbed::for_channel(
            &notice(Some("https://sheets.example/aria"), Some("https://img.example/a.png")),
            DEFAULT_CHARACTER_IMAGE,
        );
        assert_eq!(
            field(&embed, "Character Sheet").unwrap().value,
            "[View Sheet](https://sheets.example/aria)"
        );
        assert_eq!(embed.thumbnail_url, "https://img.example/a.png");
        assert_eq!(embed.fields.last().unwrap().name, "**Action Required**");
    }

    // -----------------------------------------------------------------------
    // Owner DM
    // -----------------------------------------------------------------------

    #[test]
    fn owner_embed_carries_total_xp() {
        let embed = LevelUpEmbed::for_owner(&notice(None, None), DEFAULT_CHARACTER_IMAGE);
        assert_eq!(field(&embed, "New Total XP").unwrap().value, "6,500");
        assert_eq!(field(&embed, "Action Required").unwrap().value, REMINDER);
        assert!(!field(&embed, "Player").unwrap().inline);
    }

    #[test]
    fn owner_embed_folds_sheet_link_into_reminder() {
        let embed = LevelUpEmbed::for_owner(
            &notice(Some("https://sheets.example/aria"), None),
            DEFAULT_CHARACTER_IMAGE,
        );
        assert!(field(&embed, "Action Required")
            .unwrap()
            .value
            .contains("[character sheet](https://sheets.example/aria)"));
        assert!(field(&embed, "Character Sheet").is_none());
    }
}
