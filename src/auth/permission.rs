//! Privilege checks for MODULIST.
//!
//! Ranks are ordered so that a lower number means more capability. A
//! principal may perform an operation when its rank is numerically less
//! than or equal to the operation's required rank.

use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error};

use super::session::SessionManager;
use crate::db::{Principal, PrivilegeRank, UserDirectory};

/// Authorization errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No valid session, or the session's principal cannot be resolved.
    #[error("not authenticated")]
    Unauthenticated,

    /// The principal's rank is too low for the operation.
    #[error("insufficient privilege")]
    InsufficientPrivilege,

    /// The user directory failed.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Check a principal against the minimum required rank.
///
/// # Examples
///
/// ```
/// use modulist::auth::check_privilege;
/// use modulist::db::PrivilegeRank;
///
/// assert!(check_privilege(PrivilegeRank::ADMIN, PrivilegeRank::REVIEWER).is_ok());
/// assert!(check_privilege(PrivilegeRank::REVIEWER, PrivilegeRank::ADMIN).is_err());
/// ```
pub fn check_privilege(rank: PrivilegeRank, minimum: PrivilegeRank) -> Result<(), AuthError> {
    if rank.satisfies(minimum) {
        Ok(())
    } else {
        Err(AuthError::InsufficientPrivilege)
    }
}

/// Resolves the caller of a request and enforces a minimum rank.
///
/// The gate only reads. Re-issuing the session after a successful check
/// is left to the caller.
pub struct AuthorizationGate<'a, D: UserDirectory> {
    sessions: &'a SessionManager,
    directory: &'a D,
}

impl<'a, D: UserDirectory> AuthorizationGate<'a, D> {
    /// Create a gate over a session manager and a user directory.
    pub fn new(sessions: &'a SessionManager, directory: &'a D) -> Self {
        Self {
            sessions,
            directory,
        }
    }

    /// Authorize the request carrying `jar` for an operation requiring
    /// `minimum`.
    ///
    /// Missing, invalid and expired sessions, unknown subjects and
    /// disabled accounts are all reported as `Unauthenticated`.
    pub async fn authorize(
        &self,
        jar: &CookieJar,
        minimum: PrivilegeRank,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        let subject = self.sessions.read(jar, now).map_err(|e| {
            debug!("Authorization failed: {}", e);
            AuthError::Unauthenticated
        })?;

        let principal = self
            .directory
            .find_by_contact(&subject)
            .await
            .map_err(|e| {
                error!("User lookup failed during authorization: {}", e);
                AuthError::Storage(e.to_string())
            })?
            .ok_or(AuthError::Unauthenticated)?;

        if !principal.enabled {
            debug!(user_id = %principal.id, "Authorization failed: account disabled");
            return Err(AuthError::Unauthenticated);
        }

        check_privilege(principal.privileges, minimum)?;

        Ok(principal)
    }
}
