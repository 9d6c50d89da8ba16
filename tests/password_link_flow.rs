//! Password link and settings flow tests.
//!
//! Covers the full account lifecycle over HTTP and the race between two
//! consumers of the same link.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{login, seed_principal, spawn_app, test_hasher, ADMIN_MAIL, PASSWORD, REVIEWER_MAIL};
use modulist::auth::{LinkError, PasswordLinkIssuer};
use modulist::db::{PasswordLinkRepository, PrincipalRepository, PrivilegeRank};
use modulist::Database;

const NEW_PASSWORD: &str = "another-long-secret-7!";
const LINK_INVALID: &str = "Link invalid or expired.";

async fn create_account(app: &common::TestApp, mail: &str) -> String {
    let cookie = login(&app.server, ADMIN_MAIL, PASSWORD).await;
    let response = app
        .server
        .post("/admin/users")
        .add_cookie(cookie)
        .json(&json!({ "first_name": "Barbara", "last_name": "Liskov", "mail": mail }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    body["data"]["password_link"]["path"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_new_account_lifecycle() {
    let app = spawn_app().await;
    let path = create_account(&app, "barbara@example.org").await;

    let info = app.server.get(&path).await;
    info.assert_status_ok();
    let body: Value = info.json();
    assert_eq!(body["data"]["mail"], "barbara@example.org");
    assert!(body["data"]["expires_at"].is_string());

    let submit = app
        .server
        .post(&path)
        .json(&json!({ "password": NEW_PASSWORD, "repeat_password": NEW_PASSWORD }))
        .await;
    submit.assert_status_ok();

    // Enabled and verified now.
    let repo = PrincipalRepository::new(app.db.pool());
    let principal = repo.get_by_mail("barbara@example.org").await.unwrap().unwrap();
    assert!(principal.enabled);
    assert!(principal.mail_verified);

    login(&app.server, "barbara@example.org", NEW_PASSWORD).await;

    // Single use.
    let reuse = app.server.get(&path).await;
    reuse.assert_status(StatusCode::NOT_FOUND);
    let body: Value = reuse.json();
    assert_eq!(body["error"]["message"], LINK_INVALID);

    app.server
        .post(&path)
        .json(&json!({ "password": NEW_PASSWORD, "repeat_password": NEW_PASSWORD }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_link_rejects_weak_password_and_stays_valid() {
    let app = spawn_app().await;
    let path = create_account(&app, "barbara@example.org").await;

    let weak = app
        .server
        .post(&path)
        .json(&json!({ "password": "short", "repeat_password": "short" }))
        .await;
    weak.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let mismatch = app
        .server
        .post(&path)
        .json(&json!({ "password": NEW_PASSWORD, "repeat_password": "different-secret-1!" }))
        .await;
    mismatch.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    app.server.get(&path).await.assert_status_ok();
}

#[tokio::test]
async fn test_unknown_and_expired_links_look_the_same() {
    let app = spawn_app().await;
    let store = PasswordLinkRepository::new(app.db.pool());
    let expired = PasswordLinkIssuer::new(&store)
        .issue(
            &app.disabled,
            Duration::days(5),
            Utc::now() - Duration::days(5) - Duration::seconds(1),
        )
        .await
        .unwrap();

    let unknown = app.server.get("/password-link/does-not-exist").await;
    let stale = app
        .server
        .get(&format!("/password-link/{}", expired.secret_token))
        .await;

    unknown.assert_status(StatusCode::NOT_FOUND);
    stale.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(unknown.json::<Value>(), stale.json::<Value>());

    let submit = app
        .server
        .post(&format!("/password-link/{}", expired.secret_token))
        .json(&json!({ "password": NEW_PASSWORD, "repeat_password": NEW_PASSWORD }))
        .await;
    submit.assert_status(StatusCode::NOT_FOUND);

    let repo = PrincipalRepository::new(app.db.pool());
    assert!(!repo.get_by_id(&app.disabled.id).await.unwrap().unwrap().enabled);
}

#[tokio::test]
async fn test_change_password_via_settings() {
    let app = spawn_app().await;
    let cookie = login(&app.server, REVIEWER_MAIL, PASSWORD).await;

    let response = app
        .server
        .post("/settings/password")
        .add_cookie(cookie)
        .json(&json!({
            "old_password": PASSWORD,
            "new_password": NEW_PASSWORD,
            "repeat_new_password": NEW_PASSWORD
        }))
        .await;

    response.assert_status_ok();
    assert!(!response.cookie("Token").value().is_empty());

    app.server
        .post("/login")
        .json(&json!({ "mail": REVIEWER_MAIL, "password": PASSWORD }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    login(&app.server, REVIEWER_MAIL, NEW_PASSWORD).await;
}

#[tokio::test]
async fn test_change_password_wrong_old_password() {
    let app = spawn_app().await;
    let cookie = login(&app.server, REVIEWER_MAIL, PASSWORD).await;

    let response = app
        .server
        .post("/settings/password")
        .add_cookie(cookie)
        .json(&json!({
            "old_password": "wrong-horse-battery-9",
            "new_password": NEW_PASSWORD,
            "repeat_new_password": NEW_PASSWORD
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    login(&app.server, REVIEWER_MAIL, PASSWORD).await;
}

#[tokio::test]
async fn test_change_password_revokes_links() {
    let app = spawn_app().await;
    let store = PasswordLinkRepository::new(app.db.pool());
    let link = PasswordLinkIssuer::new(&store)
        .issue(&app.reviewer, Duration::days(5), Utc::now())
        .await
        .unwrap();
    let cookie = login(&app.server, REVIEWER_MAIL, PASSWORD).await;

    app.server
        .post("/settings/password")
        .add_cookie(cookie)
        .json(&json!({
            "old_password": PASSWORD,
            "new_password": NEW_PASSWORD,
            "repeat_new_password": NEW_PASSWORD
        }))
        .await
        .assert_status_ok();

    app.server
        .get(&format!("/password-link/{}", link.secret_token))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// Two consumers race on the same link against a file-backed database.
/// Exactly one of them wins; the other sees the link as gone.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consume_single_winner() {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(Database::open(dir.path().join("race.db")).await.unwrap());

    let principal = seed_principal(&db, "Barbara", "barbara@example.org", PrivilegeRank::REVIEWER, false).await;
    let store = PasswordLinkRepository::new(db.pool());
    let link = PasswordLinkIssuer::new(&store)
        .issue(&principal, Duration::days(5), Utc::now())
        .await
        .unwrap();

    const CONTENDERS: usize = 8;
    let hasher = test_hasher();
    let mut handles = Vec::new();
    for i in 0..CONTENDERS {
        let db = Arc::clone(&db);
        let link = link.clone();
        let hash = hasher
            .hash(&format!("contender-password-{i}!"))
            .unwrap();
        handles.push(tokio::spawn(async move {
            let store = PasswordLinkRepository::new(db.pool());
            let result = PasswordLinkIssuer::new(&store)
                .consume(&link, &hash, Utc::now())
                .await;
            (hash, result)
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        let (hash, result) = handle.await.unwrap();
        match result {
            Ok(user_id) => {
                assert_eq!(user_id, principal.id);
                winners.push(hash);
            }
            Err(e) => assert_eq!(e, LinkError::NotFound),
        }
    }

    assert_eq!(winners.len(), 1, "exactly one consumer must win");

    let stored = PrincipalRepository::new(db.pool())
        .get_by_id(&principal.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.password_hash, winners[0]);
    assert!(stored.enabled);
    assert!(store.list_for_user(&principal.id).await.unwrap().is_empty());
}
