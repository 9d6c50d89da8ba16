//! Password link repository.
//!
//! A password link ties a random secret to one principal and lets that
//! principal set a password exactly once before the link expires.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::traits::PasswordLinkStore;
use super::DbPool;
use crate::{ModulistError, Result};

/// Password link entity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PasswordLink {
    /// Link ID.
    pub id: String,
    /// Owning principal.
    pub user_id: String,
    /// Secret token carried in the URL.
    #[serde(skip_serializing)]
    pub secret_token: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl PasswordLink {
    /// Check whether the link has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// New password link for creation.
#[derive(Debug, Clone)]
pub struct NewPasswordLink {
    /// Owning principal.
    pub user_id: String,
    /// Secret token.
    pub secret_token: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// Result of an atomic consume attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The link was deleted and the principal updated.
    Consumed {
        /// The principal whose password was set.
        user_id: String,
    },
    /// No link row was deleted; it was already consumed or never existed.
    NotFound,
    /// The link exists but has expired; nothing was changed.
    Expired,
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, secret_token, expires_at, created_at FROM password_links";

/// Repository for password link operations.
pub struct PasswordLinkRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> PasswordLinkRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new password link.
    pub async fn create(&self, new_link: &NewPasswordLink) -> Result<PasswordLink> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO password_links (id, user_id, secret_token, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&id)
        .bind(&new_link.user_id)
        .bind(&new_link.secret_token)
        .bind(new_link.expires_at)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| ModulistError::NotFound("password link".to_string()))
    }

    /// Get a password link by ID.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<PasswordLink>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = $1");
        let link = sqlx::query_as::<_, PasswordLink>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(link)
    }

    /// Get a password link by its secret.
    pub async fn get_by_secret(&self, secret: &str) -> Result<Option<PasswordLink>> {
        let sql = format!("{SELECT_COLUMNS} WHERE secret_token = $1");
        let link = sqlx::query_as::<_, PasswordLink>(&sql)
            .bind(secret)
            .fetch_optional(self.pool)
            .await?;
        Ok(link)
    }

    /// List all links of a principal, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<PasswordLink>> {
        let sql = format!("{SELECT_COLUMNS} WHERE user_id = $1 ORDER BY created_at DESC");
        let links = sqlx::query_as::<_, PasswordLink>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(links)
    }

    /// Consume a link and set the owner's password in one transaction.
    ///
    /// The first statement is the delete of the link row, so concurrent
    /// consumers serialize on the write lock and only the first one sees
    /// an affected row.
    pub async fn consume(
        &self,
        link_id: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome> {
        let mut tx = self.pool.begin().await?;

        let deleted: Option<(String, DateTime<Utc>)> = sqlx::query_as(
            "DELETE FROM password_links WHERE id = $1 RETURNING user_id, expires_at",
        )
        .bind(link_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id, expires_at)) = deleted else {
            tx.rollback().await?;
            debug!(link_id, "Password link already consumed");
            return Ok(ConsumeOutcome::NotFound);
        };

        if now > expires_at {
            // Expired links stay in storage; only the purge removes them.
            tx.rollback().await?;
            return Ok(ConsumeOutcome::Expired);
        }

        sqlx::query("DELETE FROM password_links WHERE user_id = $1")
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query(
            "UPDATE users SET password_hash = $1, mail_verified = 1, enabled = 1 WHERE id = $2",
        )
        .bind(new_password_hash)
        .bind(&user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(ConsumeOutcome::NotFound);
        }

        tx.commit().await?;
        Ok(ConsumeOutcome::Consumed { user_id })
    }

    /// Delete all links for a principal.
    pub async fn delete_for_user(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM password_links WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete links that expired before `now`.
    ///
    /// Timestamps are compared through `julianday` because stored values
    /// are RFC 3339 text with varying fractional precision.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM password_links WHERE julianday(expires_at) < julianday($1)")
                .bind(now)
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}

impl PasswordLinkStore for PasswordLinkRepository<'_> {
    async fn create(&self, link: &NewPasswordLink) -> Result<PasswordLink> {
        PasswordLinkRepository::create(self, link).await
    }

    async fn find_by_secret(&self, secret: &str) -> Result<Option<PasswordLink>> {
        self.get_by_secret(secret).await
    }

    async fn consume(
        &self,
        link_id: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<ConsumeOutcome> {
        PasswordLinkRepository::consume(self, link_id, new_password_hash, now).await
    }

    async fn delete_for_user(&self, user_id: &str) -> Result<u64> {
        PasswordLinkRepository::delete_for_user(self, user_id).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        PasswordLinkRepository::delete_expired(self, now).await
    }
}
