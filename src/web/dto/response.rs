//! Response DTOs for the web API.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{PasswordLink, Principal, PrivilegeRank};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Public view of a principal. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Contact address.
    pub mail: String,
    /// Whether the address is verified.
    pub mail_verified: bool,
    /// Privilege rank.
    pub privileges: PrivilegeRank,
    /// Whether the account may log in.
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Principal> for UserResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.clone(),
            first_name: principal.first_name.clone(),
            last_name: principal.last_name.clone(),
            mail: principal.mail.clone(),
            mail_verified: principal.mail_verified,
            privileges: principal.privileges,
            enabled: principal.enabled,
            created_at: principal.created_at,
        }
    }
}

impl From<Principal> for UserResponse {
    fn from(principal: Principal) -> Self {
        Self::from(&principal)
    }
}

/// An issued password link, returned to the administrator.
#[derive(Debug, Serialize)]
pub struct PasswordLinkResponse {
    /// Relative URL the account owner must visit.
    pub path: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl From<&PasswordLink> for PasswordLinkResponse {
    fn from(link: &PasswordLink) -> Self {
        Self {
            path: format!("/password-link/{}", link.secret_token),
            expires_at: link.expires_at,
        }
    }
}

/// Account together with its fresh password link.
#[derive(Debug, Serialize)]
pub struct AccountWithLinkResponse {
    /// The account.
    pub user: UserResponse,
    /// The link to set its password.
    pub password_link: PasswordLinkResponse,
}

/// What the owner of a password link sees before choosing a password.
#[derive(Debug, Serialize)]
pub struct PasswordLinkInfo {
    /// Owner's contact address.
    pub mail: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Create a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_omits_hash() {
        let principal = Principal {
            id: "id-1".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            mail: "ada@example.org".to_string(),
            mail_verified: true,
            password_hash: "$argon2id$secret".to_string(),
            privileges: PrivilegeRank::ADMIN,
            enabled: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(UserResponse::from(&principal)).unwrap();
        assert_eq!(json["mail"], "ada@example.org");
        assert_eq!(json["privileges"], 0);
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_password_link_path() {
        let link = PasswordLink {
            id: "link-1".to_string(),
            user_id: "id-1".to_string(),
            secret_token: "abc123".to_string(),
            expires_at: Utc::now(),
            created_at: Utc::now(),
        };
        let response = PasswordLinkResponse::from(&link);
        assert_eq!(response.path, "/password-link/abc123");
    }
}
