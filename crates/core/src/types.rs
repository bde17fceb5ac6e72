/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Discord snowflakes (users, guilds, channels) stored as PostgreSQL BIGINT.
pub type DiscordId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
