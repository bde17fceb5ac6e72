//! `/dm_profile_set` and `/dm_profile_view`.

use tavern_core::validation::normalize_dm_name;
use tavern_db::models::dm_profile::DmProfile;
use tavern_db::repositories::{DmProfileRepo, QuestRepo};

use super::{CommandArgs, CommandContext, Invocation, Reply};
use crate::error::BotError;

pub const SET: &str = "dm_profile_set";
pub const VIEW: &str = "dm_profile_view";

/// Store the caller's DM display name and apply it to their existing quest
/// assignments.
pub async fn set(
    ctx: &CommandContext,
    invocation: Invocation,
    args: &CommandArgs,
) -> Result<Reply, BotError> {
    let name = normalize_dm_name(args.required_str("name")?)?;
    let profile = QuestRepo::rename_dm(&ctx.pool, invocation.user_id, &name).await?;

    tracing::info!(user_id = invocation.user_id, name = %profile.preferred_dm_name, "DM profile updated");
    Ok(Reply::private(format!(
        "Your DM name is now **{}**. It will be shown on all quests you run.",
        profile.preferred_dm_name
    )))
}

pub async fn view(ctx: &CommandContext, invocation: Invocation) -> Result<Reply, BotError> {
    let profile = DmProfileRepo::find(&ctx.pool, invocation.user_id).await?;
    Ok(Reply::private(describe(profile.as_ref())))
}

fn describe(profile: Option<&DmProfile>) -> String {
    match profile {
        Some(p) => format!(
            "Your DM name is **{}** (last updated {}).",
            p.preferred_dm_name,
            p.updated_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => format!("You have not set a DM name yet. Use `/{SET}` to choose one."),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn describe_existing_profile() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 18, 30, 0).unwrap();
        let profile = DmProfile {
            user_id: 1,
            preferred_dm_name: "Game Master Grim".into(),
            created_at: at,
            updated_at: at,
        };
        assert_eq!(
            describe(Some(&profile)),
            "Your DM name is **Game Master Grim** (last updated 2025-03-01 18:30 UTC)."
        );
    }

    #[test]
    fn describe_missing_profile_points_to_set() {
        assert!(describe(None).contains("/dm_profile_set"));
    }
}
