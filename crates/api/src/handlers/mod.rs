pub mod auth;
pub mod characters;
pub mod dms;
pub mod me;
pub mod quests;
pub mod stats;
