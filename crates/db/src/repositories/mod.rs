//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or any `PgExecutor`) as the first argument.

pub mod character_repo;
pub mod dm_profile_repo;
pub mod guild_config_repo;
pub mod quest_repo;
pub mod user_repo;

pub use character_repo::CharacterRepo;
pub use dm_profile_repo::DmProfileRepo;
pub use guild_config_repo::GuildConfigRepo;
pub use quest_repo::QuestRepo;
pub use user_repo::UserRepo;
