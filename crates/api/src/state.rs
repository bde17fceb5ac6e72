use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool and the HTTP client are handles, the config
/// sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tavern_db::DbPool,
    /// Server configuration (JWT and Discord OAuth settings included).
    pub config: Arc<ServerConfig>,
    /// Outbound HTTP client for the Discord OAuth endpoints.
    pub http: reqwest::Client,
}
