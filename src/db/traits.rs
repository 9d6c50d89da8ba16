//! Persistence seams used by the auth core.
//!
//! The session, authorization and password link components only talk to
//! storage through these traits. `PrincipalRepository` and
//! `PasswordLinkRepository` are the SQLite implementations.

use std::future::Future;

use chrono::{DateTime, Utc};

use super::password_link::{ConsumeOutcome, NewPasswordLink, PasswordLink};
use super::user::{Principal, PrincipalUpdate};
use crate::Result;

/// Lookup and update of principals.
pub trait UserDirectory: Sync {
    /// Find a principal by contact address.
    fn find_by_contact(
        &self,
        mail: &str,
    ) -> impl Future<Output = Result<Option<Principal>>> + Send;

    /// Find a principal by identifier.
    fn find_by_id(&self, id: &str) -> impl Future<Output = Result<Option<Principal>>> + Send;

    /// Apply a partial update. Returns the updated principal, or `None`
    /// if it does not exist.
    fn update(
        &self,
        id: &str,
        update: &PrincipalUpdate,
    ) -> impl Future<Output = Result<Option<Principal>>> + Send;
}

/// Storage of single-use password links.
pub trait PasswordLinkStore: Sync {
    /// Persist a new link.
    fn create(&self, link: &NewPasswordLink) -> impl Future<Output = Result<PasswordLink>> + Send;

    /// Find a link by its secret.
    fn find_by_secret(
        &self,
        secret: &str,
    ) -> impl Future<Output = Result<Option<PasswordLink>>> + Send;

    /// Atomically delete the link, drop every other link of the same
    /// principal, and set the principal's new password hash.
    ///
    /// Deleting the link row is the serialization point: of two
    /// concurrent calls only the one whose delete affects a row proceeds.
    fn consume(
        &self,
        link_id: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<ConsumeOutcome>> + Send;

    /// Delete all links belonging to a principal.
    fn delete_for_user(&self, user_id: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Delete links that expired before `now`.
    fn delete_expired(&self, now: DateTime<Utc>) -> impl Future<Output = Result<u64>> + Send;
}
