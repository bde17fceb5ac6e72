use tavern_core::types::DiscordId;

use crate::auth::jwt::JwtConfig;
use crate::auth::oauth::DiscordOAuthConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Mark cookies `Secure` (default: on unless the redirect URI is plain http).
    pub secure_cookies: bool,
    /// JWT session configuration.
    pub jwt: JwtConfig,
    /// Discord application credentials.
    pub discord: DiscordOAuthConfig,
    /// Guild whose members may sign in to the dashboard.
    pub guild_id: Option<DiscordId>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5001`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SECURE_COOKIES`       | derived from redirect URI  |
    /// | `GUILD_ID`             | none (login refused)       |
    ///
    /// See [`JwtConfig::from_lookup`] and [`DiscordOAuthConfig::from_lookup`]
    /// for the remaining variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "5001".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = lookup("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_lookup(&lookup);
        let discord = DiscordOAuthConfig::from_lookup(&lookup);

        let secure_cookies = match lookup("SECURE_COOKIES") {
            Some(raw) => raw
                .trim()
                .parse()
                .expect("SECURE_COOKIES must be true or false"),
            None => discord.redirect_uri.starts_with("https://"),
        };

        let guild_id = lookup("GUILD_ID")
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse::<DiscordId>()
                    .expect("GUILD_ID must be a valid Discord id")
            });

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            secure_cookies,
            jwt,
            discord,
            guild_id,
        }
    }
}
