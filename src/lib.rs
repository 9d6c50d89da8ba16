//! MODULIST - review tool for academic module descriptions.
//!
//! This crate holds the session and account core: signed session tokens
//! carried in cookies, a privilege-ordered authorization gate, single-use
//! password links, and the JSON web API built on top of them.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    authenticate, validate_password, verify_password, AccountError, AuthError,
    AuthorizationGate, CredentialHasher, LinkError, LoginError, PasswordError,
    PasswordLinkIssuer, SessionError, SessionManager, TokenCodec, TokenError,
};
pub use config::Config;
pub use db::{Database, NewPrincipal, Principal, PrincipalRepository, PrivilegeRank};
pub use error::{ModulistError, Result};
