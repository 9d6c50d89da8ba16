//! Authentication module for MODULIST.
//!
//! This module provides signed session tokens, cookie sessions, the
//! privilege gate, password hashing, password links, and account
//! lifecycle operations.

pub mod account;
mod login;
mod password;
pub mod password_link;
mod permission;
mod session;
pub mod token;

pub use account::{
    bootstrap_admin, change_password, complete_password_link, create_account,
    deactivate_account, delete_account, reactivate_account, AccountError, NewAccount,
};
pub use login::{authenticate, LoginError};
pub use password::{
    validate_password, verify_password, CredentialHasher, PasswordError, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH, SPECIAL_CHARACTERS,
};
pub use password_link::{generate_secret, LinkError, PasswordLinkIssuer};
pub use permission::{check_privilege, AuthError, AuthorizationGate};
pub use session::{SessionError, SessionManager, SESSION_COOKIE};
pub use token::{Claims, TokenCodec, TokenError};
