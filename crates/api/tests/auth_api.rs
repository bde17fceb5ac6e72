//! HTTP-level integration tests for dashboard login, session handling and
//! logout. Discord itself is never contacted: every case here is decided
//! before the code exchange.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, get_with_cookie, post_json, set_cookies, session_token};
use sqlx::PgPool;

const USER: i64 = 123_456_789_012_345_678;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_with_bearer_token(pool: PgPool) {
    let token = session_token(USER, "Grim");
    let response = get_auth(common::build_test_app(pool), "/api/v1/me", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user_id"], USER);
    assert_eq!(json["data"]["username"], "Grim");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_with_session_cookie(pool: PgPool) {
    let token = session_token(USER, "Grim");
    let response = get_with_cookie(
        common::build_test_app(pool),
        "/api/v1/me",
        &format!("theme=dark; session={token}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["user_id"], USER);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_without_session_is_401(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/me").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_with_forged_token_is_401(pool: PgPool) {
    let response = get_auth(common::build_test_app(pool), "/api/v1/me", "not.a.jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_redirects_to_discord_with_state_cookie(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/auth/login").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers().get("location").unwrap().to_str().unwrap();
    assert!(location.starts_with("https://discord.com/api/v10/oauth2/authorize?"));
    assert!(location.contains("client_id=test-client"));
    assert!(location.contains("response_type=code"));

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("oauth_state="));
    assert!(cookies[0].contains("HttpOnly"));

    // The state in the URL matches the cookie.
    let nonce = cookies[0]
        .trim_start_matches("oauth_state=")
        .split(';')
        .next()
        .unwrap();
    assert!(location.contains(&format!("state={nonce}")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_without_oauth_credentials_is_500(pool: PgPool) {
    let mut config = common::test_config();
    config.discord.client_secret.clear();

    let response = get(common::build_test_app_with(pool, config), "/auth/login").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_without_code_is_400(pool: PgPool) {
    let response = get_with_cookie(
        common::build_test_app(pool),
        "/auth/callback?state=abc",
        "oauth_state=abc",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_with_denied_consent_is_401(pool: PgPool) {
    let response = get(
        common::build_test_app(pool),
        "/auth/callback?error=access_denied",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_with_mismatched_state_is_401(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get_with_cookie(app, "/auth/callback?code=c&state=abc", "oauth_state=xyz").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = get(app, "/auth/callback?code=c&state=abc").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_without_configured_guild_is_403(pool: PgPool) {
    let mut config = common::test_config();
    config.guild_id = None;

    let response = get_with_cookie(
        common::build_test_app_with(pool, config),
        "/auth/callback?code=c&state=abc",
        "oauth_state=abc",
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Logout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_expires_session_cookie(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/auth/logout",
        serde_json::json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("session=;"));
    assert!(cookies[0].contains("Max-Age=0"));
}
