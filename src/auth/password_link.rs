//! Single-use password links.
//!
//! A link lets a new or reactivated account choose its password once.
//! Consuming a link enables the account and invalidates every other
//! outstanding link of the same principal.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, error, info};

use super::password::random_hex;
use crate::db::{ConsumeOutcome, NewPasswordLink, PasswordLink, PasswordLinkStore, Principal};

/// Random bytes per link secret (hex-encoded to 72 characters).
pub const SECRET_BYTES: usize = 36;

/// Password link errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// No link with that secret.
    #[error("password link not found")]
    NotFound,

    /// The link exists but has expired.
    #[error("password link expired")]
    Expired,

    /// The expiry would fall outside the representable time range.
    #[error("password link validity out of range")]
    ValidityOutOfRange,

    /// The link store failed.
    #[error("storage error: {0}")]
    Storage(String),
}

fn storage(e: crate::ModulistError) -> LinkError {
    error!("Password link storage failure: {}", e);
    LinkError::Storage(e.to_string())
}

/// Generate a fresh link secret.
pub fn generate_secret() -> String {
    random_hex(SECRET_BYTES)
}

/// Issues, resolves and consumes password links against a store.
pub struct PasswordLinkIssuer<'a, S: PasswordLinkStore> {
    store: &'a S,
}

impl<'a, S: PasswordLinkStore> PasswordLinkIssuer<'a, S> {
    /// Create an issuer over a link store.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Issue a link for `principal`, valid until `now + valid_for`.
    pub async fn issue(
        &self,
        principal: &Principal,
        valid_for: Duration,
        now: DateTime<Utc>,
    ) -> Result<PasswordLink, LinkError> {
        let expires_at = now
            .checked_add_signed(valid_for)
            .ok_or(LinkError::ValidityOutOfRange)?;
        let new_link = NewPasswordLink {
            user_id: principal.id.clone(),
            secret_token: generate_secret(),
            expires_at,
        };

        let link = self.store.create(&new_link).await.map_err(storage)?;
        info!(
            user_id = %principal.id,
            expires_at = %link.expires_at,
            "Password link issued"
        );
        Ok(link)
    }

    /// Look a link up by secret and reject it if expired.
    pub async fn resolve(&self, secret: &str, now: DateTime<Utc>) -> Result<PasswordLink, LinkError> {
        let link = self
            .store
            .find_by_secret(secret)
            .await
            .map_err(storage)?
            .ok_or(LinkError::NotFound)?;

        if link.is_expired(now) {
            debug!(link_id = %link.id, "Password link expired");
            return Err(LinkError::Expired);
        }

        Ok(link)
    }

    /// Consume a resolved link, setting the owner's password hash.
    ///
    /// Returns the owner's id. A link that was consumed concurrently
    /// yields `NotFound`.
    pub async fn consume(
        &self,
        link: &PasswordLink,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<String, LinkError> {
        match self
            .store
            .consume(&link.id, new_password_hash, now)
            .await
            .map_err(storage)?
        {
            ConsumeOutcome::Consumed { user_id } => {
                info!(user_id = %user_id, "Password link consumed");
                Ok(user_id)
            }
            ConsumeOutcome::NotFound => Err(LinkError::NotFound),
            ConsumeOutcome::Expired => Err(LinkError::Expired),
        }
    }

    /// Drop all outstanding links of a principal.
    pub async fn revoke_all(&self, user_id: &str) -> Result<u64, LinkError> {
        self.store.delete_for_user(user_id).await.map_err(storage)
    }

    /// Delete expired links. Only needed for storage hygiene.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, LinkError> {
        let removed = self.store.delete_expired(now).await.map_err(storage)?;
        if removed > 0 {
            info!("Purged {} expired password links", removed);
        }
        Ok(removed)
    }
}
