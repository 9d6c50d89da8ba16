//! Principal model for MODULIST.
//!
//! This module defines the `Principal` record and the `PrivilegeRank`
//! used for access control.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Privilege rank of a principal.
///
/// Lower values denote more capability: `ADMIN` (0) outranks
/// `REVIEWER` (1).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct PrivilegeRank(pub i64);

impl PrivilegeRank {
    /// Administrators: user management and everything below.
    pub const ADMIN: PrivilegeRank = PrivilegeRank(0);
    /// Reviewers: browse modules, leave feedback, manage own settings.
    pub const REVIEWER: PrivilegeRank = PrivilegeRank(1);

    /// Check whether this rank is sufficient for an operation that
    /// requires at most `required`.
    ///
    /// # Examples
    ///
    /// ```
    /// use modulist::db::PrivilegeRank;
    ///
    /// assert!(PrivilegeRank::ADMIN.satisfies(PrivilegeRank::REVIEWER));
    /// assert!(PrivilegeRank::REVIEWER.satisfies(PrivilegeRank::REVIEWER));
    /// assert!(!PrivilegeRank::REVIEWER.satisfies(PrivilegeRank::ADMIN));
    /// ```
    pub fn satisfies(&self, required: PrivilegeRank) -> bool {
        self.0 <= required.0
    }

    /// Get the raw rank value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Ranks are non-negative; `ADMIN` is the strongest.
    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }
}

impl Default for PrivilegeRank {
    fn default() -> Self {
        PrivilegeRank::REVIEWER
    }
}

impl fmt::Display for PrivilegeRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PrivilegeRank::ADMIN => write!(f, "admin"),
            PrivilegeRank::REVIEWER => write!(f, "reviewer"),
            PrivilegeRank(n) => write!(f, "rank-{n}"),
        }
    }
}

impl FromStr for PrivilegeRank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(PrivilegeRank::ADMIN),
            "reviewer" => Ok(PrivilegeRank::REVIEWER),
            other => match other.parse::<i64>() {
                Ok(n) if PrivilegeRank(n).is_valid() => Ok(PrivilegeRank(n)),
                _ => Err(format!("unknown privilege rank: {s}")),
            },
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Principal {
    /// Stable identifier (UUID v4), never reused.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Contact address; also the session token subject.
    pub mail: String,
    /// Whether the contact address has been verified.
    pub mail_verified: bool,
    /// Argon2 PHC hash.
    pub password_hash: String,
    /// Privilege rank.
    pub privileges: PrivilegeRank,
    /// Whether the account may log in.
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Principal {
    /// Full display name.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check whether this principal holds at least the required rank.
    pub fn has_privilege(&self, required: PrivilegeRank) -> bool {
        self.privileges.satisfies(required)
    }

    /// Check whether this principal is an administrator.
    pub fn is_admin(&self) -> bool {
        self.privileges == PrivilegeRank::ADMIN
    }
}

/// Data for creating a new principal.
#[derive(Debug, Clone)]
pub struct NewPrincipal {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Contact address.
    pub mail: String,
    /// Pre-computed password hash.
    pub password_hash: String,
    /// Privilege rank (defaults to reviewer).
    pub privileges: PrivilegeRank,
    /// Whether the account is enabled (defaults to false).
    pub enabled: bool,
    /// Whether the contact address is verified (defaults to false).
    pub mail_verified: bool,
}

impl NewPrincipal {
    /// Create a disabled, unverified reviewer.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        mail: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            mail: mail.into(),
            password_hash: password_hash.into(),
            privileges: PrivilegeRank::REVIEWER,
            enabled: false,
            mail_verified: false,
        }
    }

    /// Set the privilege rank.
    pub fn with_privileges(mut self, privileges: PrivilegeRank) -> Self {
        self.privileges = privileges;
        self
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the mail verification flag.
    pub fn with_mail_verified(mut self, verified: bool) -> Self {
        self.mail_verified = verified;
        self
    }
}

/// Partial update of a principal.
#[derive(Debug, Clone, Default)]
pub struct PrincipalUpdate {
    /// New password hash.
    pub password_hash: Option<String>,
    /// New privilege rank.
    pub privileges: Option<PrivilegeRank>,
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// New mail verification flag.
    pub mail_verified: Option<bool>,
}

impl PrincipalUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new password hash.
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    /// Set new privilege rank.
    pub fn privileges(mut self, privileges: PrivilegeRank) -> Self {
        self.privileges = Some(privileges);
        self
    }

    /// Set enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set mail verification flag.
    pub fn mail_verified(mut self, verified: bool) -> Self {
        self.mail_verified = Some(verified);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.password_hash.is_none()
            && self.privileges.is_none()
            && self.enabled.is_none()
            && self.mail_verified.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_principal(privileges: PrivilegeRank) -> Principal {
        Principal {
            id: "8a5f5b8e-51a2-4d3e-9a43-3b0fd0f1c1aa".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            mail: "ada@example.org".to_string(),
            mail_verified: true,
            password_hash: "hash".to_string(),
            privileges,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rank_ordering() {
        assert!(PrivilegeRank::ADMIN < PrivilegeRank::REVIEWER);
        assert!(PrivilegeRank::ADMIN.satisfies(PrivilegeRank::ADMIN));
        assert!(PrivilegeRank::ADMIN.satisfies(PrivilegeRank(7)));
        assert!(PrivilegeRank::REVIEWER.satisfies(PrivilegeRank(2)));
        assert!(!PrivilegeRank(2).satisfies(PrivilegeRank::REVIEWER));
    }

    #[test]
    fn test_rank_from_str() {
        assert_eq!(PrivilegeRank::from_str("admin").unwrap(), PrivilegeRank::ADMIN);
        assert_eq!(
            PrivilegeRank::from_str("Reviewer").unwrap(),
            PrivilegeRank::REVIEWER
        );
        assert_eq!(PrivilegeRank::from_str("3").unwrap(), PrivilegeRank(3));
        assert!(PrivilegeRank::from_str("-1").is_err());
        assert!(PrivilegeRank::from_str("root").is_err());
    }

    #[test]
    fn test_rank_display() {
        assert_eq!(PrivilegeRank::ADMIN.to_string(), "admin");
        assert_eq!(PrivilegeRank::REVIEWER.to_string(), "reviewer");
        assert_eq!(PrivilegeRank(4).to_string(), "rank-4");
    }

    #[test]
    fn test_new_principal_builder() {
        let principal = NewPrincipal::new("Ada", "Lovelace", "ada@example.org", "hash")
            .with_privileges(PrivilegeRank::ADMIN)
            .with_enabled(true)
            .with_mail_verified(true);

        assert_eq!(principal.mail, "ada@example.org");
        assert_eq!(principal.privileges, PrivilegeRank::ADMIN);
        assert!(principal.enabled);
        assert!(principal.mail_verified);
    }

    #[test]
    fn test_new_principal_defaults() {
        let principal = NewPrincipal::new("Ada", "Lovelace", "ada@example.org", "hash");
        assert_eq!(principal.privileges, PrivilegeRank::REVIEWER);
        assert!(!principal.enabled);
        assert!(!principal.mail_verified);
    }

    #[test]
    fn test_principal_update_builder() {
        let update = PrincipalUpdate::new().enabled(false).privileges(PrivilegeRank::ADMIN);
        assert_eq!(update.enabled, Some(false));
        assert_eq!(update.privileges, Some(PrivilegeRank::ADMIN));
        assert!(update.password_hash.is_none());
        assert!(!update.is_empty());
        assert!(PrincipalUpdate::new().is_empty());
    }

    #[test]
    fn test_principal_helpers() {
        let admin = sample_principal(PrivilegeRank::ADMIN);
        let reviewer = sample_principal(PrivilegeRank::REVIEWER);

        assert_eq!(admin.display_name(), "Ada Lovelace");
        assert!(admin.is_admin());
        assert!(!reviewer.is_admin());
        assert!(reviewer.has_privilege(PrivilegeRank::REVIEWER));
        assert!(!reviewer.has_privilege(PrivilegeRank::ADMIN));
    }
}
