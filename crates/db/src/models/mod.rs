//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus input DTOs where the bot or dashboard writes.

pub mod character;
pub mod dm_profile;
pub mod quest;
