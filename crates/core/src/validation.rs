//! Input validation for configuration commands and dashboard writes.

use crate::error::CoreError;

/// Upper bound for `char_per_rp`.
pub const MAX_CHAR_PER_RP: i64 = 10_000;

/// Upper bound for `daily_rp_cap`.
pub const MAX_DAILY_RP_CAP: i64 = 1_000;

/// Maximum length of a DM display name, in characters.
pub const MAX_DM_NAME_LENGTH: usize = 255;

/// Maximum length of a character name, in characters.
pub const MAX_CHARACTER_NAME_LENGTH: usize = 100;

/// `char_per_rp` must be in `1..=MAX_CHAR_PER_RP`.
pub fn validate_char_per_rp(value: i64) -> Result<(), CoreError> {
    if !(1..=MAX_CHAR_PER_RP).contains(&value) {
        return Err(CoreError::Validation(format!(
            "Characters per XP must be between 1 and {MAX_CHAR_PER_RP}, got {value}"
        )));
    }
    Ok(())
}

/// `daily_rp_cap` must be in `0..=MAX_DAILY_RP_CAP`.
pub fn validate_daily_rp_cap(value: i64) -> Result<(), CoreError> {
    if !(0..=MAX_DAILY_RP_CAP).contains(&value) {
        return Err(CoreError::Validation(format!(
            "Daily RP XP cap must be between 0 and {MAX_DAILY_RP_CAP}, got {value}"
        )));
    }
    Ok(())
}

/// Trim a DM display name and check it is non-empty and short enough.
pub fn normalize_dm_name(raw: &str) -> Result<String, CoreError> {
    normalize_name(raw, "DM name", MAX_DM_NAME_LENGTH)
}

/// Trim a character name and check it is non-empty and short enough.
pub fn normalize_character_name(raw: &str) -> Result<String, CoreError> {
    normalize_name(raw, "Character name", MAX_CHARACTER_NAME_LENGTH)
}

/// Optional link fields must be absolute http(s) URLs.
pub fn validate_optional_url(value: Option<&str>, field: &str) -> Result<(), CoreError> {
    match value {
        Some(url) if !(url.starts_with("https://") || url.starts_with("http://")) => Err(
            CoreError::Validation(format!("{field} must be an http(s) URL")),
        ),
        _ => Ok(()),
    }
}

fn normalize_name(raw: &str, field: &str, max_len: usize) -> Result<String, CoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(format!("{field} cannot be empty")));
    }
    if name.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must be {max_len} characters or less"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_per_rp_bounds() {
        assert!(validate_char_per_rp(1).is_ok());
        assert!(validate_char_per_rp(240).is_ok());
        assert!(validate_char_per_rp(MAX_CHAR_PER_RP).is_ok());
        assert!(validate_char_per_rp(0).is_err());
        assert!(validate_char_per_rp(-1).is_err());
        assert!(validate_char_per_rp(MAX_CHAR_PER_RP + 1).is_err());
    }

    #[test]
    fn daily_cap_bounds() {
        assert!(validate_daily_rp_cap(0).is_ok());
        assert!(validate_daily_rp_cap(5).is_ok());
        assert!(validate_daily_rp_cap(-1).is_err());
        assert!(validate_daily_rp_cap(MAX_DAILY_RP_CAP + 1).is_err());
    }

    #[test]
    fn dm_name_is_trimmed() {
        assert_eq!(normalize_dm_name("  Sage Thorne \n").unwrap(), "Sage Thorne");
    }

    #[test]
    fn dm_name_rejects_blank() {
        let err = normalize_dm_name("   ").unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: DM name cannot be empty");
    }

    #[test]
    fn dm_name_length_counts_characters() {
        assert!(normalize_dm_name(&"é".repeat(255)).is_ok());
        assert!(normalize_dm_name(&"a".repeat(256)).is_err());
    }

    #[test]
    fn character_name_limit() {
        assert!(normalize_character_name(&"x".repeat(100)).is_ok());
        assert!(normalize_character_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn optional_url() {
        assert!(validate_optional_url(None, "sheet_url").is_ok());
        assert!(validate_optional_url(Some("https://dndbeyond.com/c/1"), "sheet_url").is_ok());
        assert!(validate_optional_url(Some("javascript:alert(1)"), "sheet_url").is_err());
    }
}
