//! Discord OAuth2 client for the dashboard login flow.
//!
//! Authorization-code grant with the `identify guilds.members.read` scopes:
//! the code is exchanged for a user token, which is then used to read the
//! user's identity and their membership of the configured guild.

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tavern_core::types::DiscordId;

/// Discord REST API base.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Scopes requested at login.
pub const SCOPES: &str = "identify guilds.members.read";

/// Default callback for local development.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5001/auth/callback";

/// Error type for Discord OAuth failures.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Discord returned a non-2xx status code.
    #[error("Discord returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// A URL could not be built from the configuration.
    #[error("Invalid OAuth URL: {0}")]
    InvalidUrl(String),

    /// The user id Discord returned is not a snowflake.
    #[error("Invalid Discord user id: {0}")]
    InvalidUserId(String),
}

/// Discord application credentials.
#[derive(Debug, Clone)]
pub struct DiscordOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_base: String,
}

impl DiscordOAuthConfig {
    /// Load OAuth configuration from a key lookup.
    ///
    /// | Env Var                 | Default                               |
    /// |-------------------------|---------------------------------------|
    /// | `DISCORD_CLIENT_ID`     | empty                                 |
    /// | `DISCORD_CLIENT_SECRET` | empty                                 |
    /// | `DISCORD_REDIRECT_URI`  | `http://localhost:5001/auth/callback` |
    /// | `DISCORD_API_BASE`      | `https://discord.com/api/v10`         |
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            client_id: lookup("DISCORD_CLIENT_ID").unwrap_or_default(),
            client_secret: lookup("DISCORD_CLIENT_SECRET").unwrap_or_default(),
            redirect_uri: lookup("DISCORD_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.into()),
            api_base: lookup("DISCORD_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.into())
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Whether login can be attempted at all.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// The Discord consent page URL carrying the anti-forgery `state`.
    pub fn authorize_url(&self, state: &str) -> Result<Url, OAuthError> {
        Url::parse_with_params(
            &format!("{}/oauth2/authorize", self.api_base),
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
                ("prompt", "none"),
            ],
        )
        .map_err(|e| OAuthError::InvalidUrl(e.to_string()))
    }
}

/// Token endpoint response (only the field we use).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// `GET /users/@me` response (only the fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl DiscordUser {
    pub fn discord_id(&self) -> Result<DiscordId, OAuthError> {
        self.id
            .parse::<DiscordId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| OAuthError::InvalidUserId(self.id.clone()))
    }

    /// The name shown on the dashboard: global display name, else username.
    pub fn display_name(&self) -> &str {
        self.global_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Exchange an authorization code for a user access token.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &DiscordOAuthConfig,
    code: &str,
) -> Result<TokenResponse, OAuthError> {
    let response = http
        .post(format!("{}/oauth2/token", config.api_base))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ])
        .send()
        .await?;

    Ok(ensure_success(response).await?.json().await?)
}

/// Fetch the identity of the token's owner.
pub async fn fetch_user(
    http: &reqwest::Client,
    config: &DiscordOAuthConfig,
    access_token: &str,
) -> Result<DiscordUser, OAuthError> {
    let response = http
        .get(format!("{}/users/@me", config.api_base))
        .bearer_auth(access_token)
        .send()
        .await?;

    Ok(ensure_success(response).await?.json().await?)
}

/// Whether the token's owner is a member of `guild_id`.
pub async fn is_guild_member(
    http: &reqwest::Client,
    config: &DiscordOAuthConfig,
    access_token: &str,
    guild_id: DiscordId,
) -> Result<bool, OAuthError> {
    let response = http
        .get(format!(
            "{}/users/@me/guilds/{guild_id}/member",
            config.api_base
        ))
        .bearer_auth(access_token)
        .send()
        .await?;

    match response.status() {
        StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => Ok(false),
        _ => ensure_success(response).await.map(|_| true),
    }
}

/// Return the response unchanged on success, or an [`OAuthError::Api`]
/// carrying the status and body text.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, OAuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(OAuthError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config() -> DiscordOAuthConfig {
        DiscordOAuthConfig {
            client_id: "1234".into(),
            client_secret: "shh".into(),
            redirect_uri: DEFAULT_REDIRECT_URI.into(),
            api_base: DEFAULT_API_BASE.into(),
        }
    }

    #[test]
    fn authorize_url_carries_client_scopes_and_state() {
        let url = config().authorize_url("nonce-1").unwrap();
        assert_eq!(url.path(), "/api/v10/oauth2/authorize");

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "1234");
        assert_eq!(params["redirect_uri"], DEFAULT_REDIRECT_URI);
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], SCOPES);
        assert_eq!(params["state"], "nonce-1");
    }

    #[test]
    fn from_lookup_defaults() {
        let config = DiscordOAuthConfig::from_lookup(&|_: &str| None);
        assert!(!config.is_configured());
        assert_eq!(config.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let config = DiscordOAuthConfig::from_lookup(&|key: &str| {
            (key == "DISCORD_API_BASE").then(|| "http://127.0.0.1:9999/".to_string())
        });
        assert_eq!(config.api_base, "http://127.0.0.1:9999");
    }

    #[test]
    fn user_display_name_prefers_global_name() {
        let mut user = DiscordUser {
            id: "42".into(),
            username: "grim_dm".into(),
            global_name: Some("Grim".into()),
            avatar: None,
        };
        assert_eq!(user.display_name(), "Grim");
        user.global_name = Some(String::new());
        assert_eq!(user.display_name(), "grim_dm");
        user.global_name = None;
        assert_eq!(user.display_name(), "grim_dm");
    }

    #[test]
    fn user_id_must_be_a_snowflake() {
        let user = DiscordUser {
            id: "not-a-number".into(),
            username: "x".into(),
            global_name: None,
            avatar: None,
        };
        assert_matches!(user.discord_id(), Err(OAuthError::InvalidUserId(_)));

        let user = DiscordUser {
            id: "123456789012345678".into(),
            ..user
        };
        assert_eq!(user.discord_id().unwrap(), 123456789012345678);
    }
}
