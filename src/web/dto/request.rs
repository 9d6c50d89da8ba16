//! Request DTOs for the web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{known_rank, no_control_chars, not_empty_trimmed};
use crate::db::PrivilegeRank;

/// Login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Contact address.
    #[validate(length(min = 1, max = 254, message = "Mail address is required"))]
    pub mail: String,
    /// Password.
    #[validate(length(min = 1, max = 1024, message = "Password is required"))]
    pub password: String,
}

/// Administrator request to create an account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// First name.
    #[validate(
        length(min = 1, max = 100, message = "First name must be 1-100 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub first_name: String,
    /// Last name.
    #[validate(
        length(min = 1, max = 100, message = "Last name must be 1-100 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub last_name: String,
    /// Contact address.
    #[validate(email(message = "Invalid mail address"))]
    pub mail: String,
    /// Privilege rank; reviewer if omitted.
    #[serde(default)]
    #[validate(custom(function = "known_rank"))]
    pub privileges: PrivilegeRank,
}

/// Request to change the caller's own password.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    /// New password.
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
    /// New password, repeated.
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub repeat_new_password: String,
}

/// Request to set a password through a password link.
#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordRequest {
    /// New password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// New password, repeated.
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub repeat_password: String,
}
