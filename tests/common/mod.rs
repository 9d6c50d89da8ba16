//! Test helpers for web API tests.
//!
//! Builds an axum-test server over an in-memory database and seeds
//! principals with cheap Argon2 parameters.

#![allow(dead_code)]

use std::sync::Arc;

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use serde_json::json;

use modulist::auth::{CredentialHasher, SessionManager, TokenCodec};
use modulist::db::{NewPrincipal, Principal, PrincipalRepository, PrivilegeRank};
use modulist::web::{create_router, AppState};
use modulist::Database;

/// Signing secret used by test servers.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// Password shared by seeded principals.
pub const PASSWORD: &str = "correct-horse-battery-9";

/// Seeded administrator.
pub const ADMIN_MAIL: &str = "ada@example.org";

/// Seeded reviewer.
pub const REVIEWER_MAIL: &str = "grace@example.org";

/// Seeded disabled reviewer.
pub const DISABLED_MAIL: &str = "alan@example.org";

/// Argon2 with minimum cost.
pub fn test_hasher() -> CredentialHasher {
    CredentialHasher::new(8, 1, 1).expect("valid test hash params")
}

/// Session manager matching the test server.
pub fn test_sessions() -> SessionManager {
    SessionManager::new(
        TokenCodec::new(TEST_SECRET).expect("non-empty secret"),
        chrono::Duration::hours(1),
        false,
    )
}

/// A test server together with its database.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub admin: Principal,
    pub reviewer: Principal,
    pub disabled: Principal,
}

/// Insert a principal with the shared password.
pub async fn seed_principal(
    db: &Database,
    first_name: &str,
    mail: &str,
    rank: PrivilegeRank,
    enabled: bool,
) -> Principal {
    let hash = test_hasher().hash(PASSWORD).expect("hash");
    PrincipalRepository::new(db.pool())
        .create(
            &NewPrincipal::new(first_name, "Tester", mail, hash)
                .with_privileges(rank)
                .with_enabled(enabled)
                .with_mail_verified(enabled),
        )
        .await
        .expect("seed principal")
}

/// Build a router over `db` and wrap it in a test server.
pub fn server_for(db: Database) -> TestServer {
    let state = AppState::new(
        db,
        test_sessions(),
        test_hasher(),
        chrono::Duration::days(5),
    );
    TestServer::new(create_router(Arc::new(state))).expect("Failed to create test server")
}

/// Create a test server with an admin, a reviewer and a disabled reviewer.
pub async fn spawn_app() -> TestApp {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let admin = seed_principal(&db, "Ada", ADMIN_MAIL, PrivilegeRank::ADMIN, true).await;
    let reviewer = seed_principal(&db, "Grace", REVIEWER_MAIL, PrivilegeRank::REVIEWER, true).await;
    let disabled = seed_principal(&db, "Alan", DISABLED_MAIL, PrivilegeRank::REVIEWER, false).await;

    TestApp {
        server: server_for(db.clone()),
        db,
        admin,
        reviewer,
        disabled,
    }
}

/// Log in and return the session cookie.
pub async fn login(server: &TestServer, mail: &str, password: &str) -> Cookie<'static> {
    let response = server
        .post("/login")
        .json(&json!({ "mail": mail, "password": password }))
        .await;
    response.assert_status_ok();
    response.cookie("Token")
}
