//! Web API Authentication Tests
//!
//! Integration tests for login, logout, session cookies and the
//! privilege gate.

mod common;

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{login, spawn_app, test_sessions, ADMIN_MAIL, DISABLED_MAIL, PASSWORD, REVIEWER_MAIL};
use modulist::auth::TokenCodec;

const NOT_AUTHORIZED: &str = "Not authorized, please log in.";

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/login")
        .json(&json!({ "mail": REVIEWER_MAIL, "password": PASSWORD }))
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"]["mail"], REVIEWER_MAIL);
    assert_eq!(body["data"]["privileges"], 1);
    assert!(body["data"].get("password_hash").is_none());

    let cookie = response.cookie("Token");
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(time::Duration::seconds(3600)));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/login")
        .json(&json!({ "mail": REVIEWER_MAIL, "password": "wrong-horse-battery-9" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], NOT_AUTHORIZED);
    assert!(response.maybe_cookie("Token").is_none());
}

#[tokio::test]
async fn test_login_unknown_user_looks_like_wrong_password() {
    let app = spawn_app().await;

    let unknown = app
        .server
        .post("/login")
        .json(&json!({ "mail": "nobody@example.org", "password": PASSWORD }))
        .await;
    let wrong = app
        .server
        .post("/login")
        .json(&json!({ "mail": REVIEWER_MAIL, "password": "wrong-horse-battery-9" }))
        .await;

    assert_eq!(unknown.status_code(), wrong.status_code());
    assert_eq!(unknown.json::<Value>(), wrong.json::<Value>());
}

#[tokio::test]
async fn test_login_disabled_account_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/login")
        .json(&json!({ "mail": DISABLED_MAIL, "password": PASSWORD }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(response.maybe_cookie("Token").is_none());
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/login")
        .json(&json!({ "mail": "", "password": "" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

// ============================================================================
// Logout Tests
// ============================================================================

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = spawn_app().await;
    let cookie = login(&app.server, REVIEWER_MAIL, PASSWORD).await;

    let response = app.server.get("/logout").add_cookie(cookie).await;

    response.assert_status_ok();
    let cleared = response.cookie("Token");
    assert_eq!(cleared.value(), "");
    assert_eq!(cleared.max_age(), Some(time::Duration::ZERO));
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = spawn_app().await;

    let response = app.server.get("/logout").await;
    response.assert_status_ok();
}

// ============================================================================
// Session Gate Tests
// ============================================================================

#[tokio::test]
async fn test_guarded_route_without_cookie() {
    let app = spawn_app().await;

    let response = app.server.get("/settings").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], NOT_AUTHORIZED);
}

#[tokio::test]
async fn test_guarded_route_with_garbage_cookie() {
    let app = spawn_app().await;

    let response = app
        .server
        .get("/settings")
        .add_cookie(Cookie::new("Token", "not-a-token"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_guarded_route_with_foreign_signature() {
    let app = spawn_app().await;
    let forged = TokenCodec::new("some-other-secret")
        .unwrap()
        .mint(ADMIN_MAIL, Utc::now(), Duration::hours(1))
        .unwrap();

    let response = app
        .server
        .get("/admin/users")
        .add_cookie(Cookie::new("Token", forged))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_rejected() {
    let app = spawn_app().await;
    let stale = test_sessions()
        .issue(&app.reviewer, Utc::now() - Duration::hours(2))
        .unwrap();

    let response = app.server.get("/settings").add_cookie(stale).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_of_disabled_account_rejected() {
    let app = spawn_app().await;
    let cookie = test_sessions().issue(&app.disabled, Utc::now()).unwrap();

    let response = app.server.get("/settings").add_cookie(cookie).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_of_deleted_account_rejected() {
    let app = spawn_app().await;
    let cookie = login(&app.server, REVIEWER_MAIL, PASSWORD).await;

    modulist::PrincipalRepository::new(app.db.pool())
        .delete(&app.reviewer.id)
        .await
        .unwrap();

    let response = app.server.get("/settings").add_cookie(cookie).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_guarded_route_refreshes_session() {
    let app = spawn_app().await;
    let cookie = test_sessions()
        .issue(&app.reviewer, Utc::now() - Duration::minutes(30))
        .unwrap();
    let old_value = cookie.value().to_string();

    let response = app.server.get("/settings").add_cookie(cookie).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["mail"], REVIEWER_MAIL);

    let refreshed = response.cookie("Token");
    assert_ne!(refreshed.value(), old_value);
    assert_eq!(refreshed.max_age(), Some(time::Duration::seconds(3600)));
}

#[tokio::test]
async fn test_reviewer_cannot_reach_admin_routes() {
    let app = spawn_app().await;
    let cookie = login(&app.server, REVIEWER_MAIL, PASSWORD).await;

    let response = app.server.get("/admin/users").add_cookie(cookie).await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(body["error"]["message"], NOT_AUTHORIZED);
}

#[tokio::test]
async fn test_admin_can_reach_reviewer_routes() {
    let app = spawn_app().await;
    let cookie = login(&app.server, ADMIN_MAIL, PASSWORD).await;

    let response = app.server.get("/settings").add_cookie(cookie).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["privileges"], 0);
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}
