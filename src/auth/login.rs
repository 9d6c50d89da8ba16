//! Credential checks at login time.

use thiserror::Error;
use tracing::{error, info, warn};

use super::password::verify_password;
use crate::db::{Principal, UserDirectory};

/// Login errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// Unknown address, wrong password or disabled account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The user directory failed.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Authenticate a principal by contact address and password.
///
/// Disabled accounts are rejected even when the password is correct.
/// All rejections look the same to the caller.
pub async fn authenticate<D: UserDirectory>(
    directory: &D,
    mail: &str,
    password: &str,
) -> Result<Principal, LoginError> {
    let principal = directory
        .find_by_contact(mail.trim())
        .await
        .map_err(|e| {
            error!("User lookup failed during login: {}", e);
            LoginError::Storage(e.to_string())
        })?;

    let Some(principal) = principal else {
        warn!(mail = %mail, "Login rejected: unknown address");
        return Err(LoginError::InvalidCredentials);
    };

    if verify_password(password, &principal.password_hash).is_err() {
        warn!(user_id = %principal.id, "Login rejected: wrong password");
        return Err(LoginError::InvalidCredentials);
    }

    if !principal.enabled {
        warn!(user_id = %principal.id, "Login rejected: account disabled");
        return Err(LoginError::InvalidCredentials);
    }

    info!(user_id = %principal.id, "User logged in");
    Ok(principal)
}
