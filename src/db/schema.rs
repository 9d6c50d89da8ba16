//! Database schema and migrations for MODULIST.

/// Database migrations, applied in order.
///
/// The `schema_version` table records which migrations have run.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id              TEXT PRIMARY KEY,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    mail            TEXT NOT NULL UNIQUE COLLATE NOCASE,
    mail_verified   INTEGER NOT NULL DEFAULT 0,
    password_hash   TEXT NOT NULL,          -- Argon2 PHC string
    privileges      INTEGER NOT NULL DEFAULT 1,  -- 0 = admin, 1 = reviewer
    enabled         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE INDEX idx_users_mail ON users(mail);
"#,
    // v2: password links
    r#"
CREATE TABLE password_links (
    id              TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    secret_token    TEXT NOT NULL UNIQUE,
    expires_at      TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE INDEX idx_password_links_user_id ON password_links(user_id);
"#,
];
