//! Pure domain logic for the Tavern roleplay XP bot.
//!
//! Nothing in this crate touches the database or the network. Callers load
//! rows and configuration, hand them to these functions, and persist the
//! results themselves.

pub mod cap_policy;
pub mod error;
pub mod guild_config;
pub mod leveling;
pub mod types;
pub mod validation;
