#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use tavern_api::auth::jwt::{generate_session_token, JwtConfig};
use tavern_api::auth::oauth::{DiscordOAuthConfig, DEFAULT_API_BASE, DEFAULT_REDIRECT_URI};
use tavern_api::config::ServerConfig;
use tavern_api::router::build_app_router;
use tavern_api::state::AppState;

pub const TEST_GUILD_ID: i64 = 900_000_000_000_000_001;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin and a 30-second request
/// timeout. OAuth credentials are dummies; Discord is never contacted.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        secure_cookies: false,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_mins: 60,
        },
        discord: DiscordOAuthConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        },
        guild_id: Some(TEST_GUILD_ID),
    }
}

/// Build the full application router through [`build_app_router`], so tests
/// exercise the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        http: reqwest::Client::new(),
    };
    build_app_router(state, &config)
}

/// A valid session token for `user_id`, signed with the test secret.
pub fn session_token(user_id: i64, username: &str) -> String {
    generate_session_token(user_id, username, None, &test_config().jwt)
        .expect("token generation should succeed")
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_with_cookie(app: Router, uri: &str, cookie: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values on a response.
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

pub async fn insert_quest(pool: &PgPool, name: &str, status: &str, bracket: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO quests (name, status, level_bracket, quest_type, start_date)
         VALUES ($1, $2, $3, 'one-shot', NOW()) RETURNING id",
    )
    .bind(name)
    .bind(status)
    .bind(bracket)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn assign_dm(pool: &PgPool, quest_id: i64, user_id: i64, username: &str, primary: bool) {
    sqlx::query(
        "INSERT INTO quest_dms (quest_id, user_id, username, is_primary) VALUES ($1, $2, $3, $4)",
    )
    .bind(quest_id)
    .bind(user_id)
    .bind(username)
    .bind(primary)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn seed_character(pool: &PgPool, user_id: i64, name: &str) -> i64 {
    sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT DO NOTHING")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query_scalar("INSERT INTO characters (user_id, name) VALUES ($1, $2) RETURNING id")
        .bind(user_id)
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn join_quest(pool: &PgPool, quest_id: i64, character_id: i64) {
    sqlx::query(
        "INSERT INTO quest_participants (quest_id, character_id, starting_level, starting_xp)
         VALUES ($1, $2, 3, 900)",
    )
    .bind(quest_id)
    .bind(character_id)
    .execute(pool)
    .await
    .unwrap();
}
