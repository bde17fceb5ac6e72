//! Dashboard authentication: Discord OAuth login and JWT sessions.

pub mod jwt;
pub mod oauth;
pub mod session;
