//! Cookie-carried sessions for MODULIST.
//!
//! Sessions are stateless: the cookie holds a signed token and nothing is
//! stored server-side. Every successful authorized request re-issues the
//! cookie, so the expiry slides forward while the user is active.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::debug;

use super::token::{TokenCodec, TokenError};
use crate::config::AuthConfig;
use crate::db::Principal;
use crate::{ModulistError, Result};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "Token";

/// Session errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// No session cookie present.
    #[error("no session")]
    NoSession,

    /// The session cookie does not carry a valid token.
    #[error("invalid session")]
    InvalidSession,
}

/// Issues, reads and destroys session cookies.
#[derive(Debug, Clone)]
pub struct SessionManager {
    codec: TokenCodec,
    valid_for: Duration,
    secure: bool,
}

impl SessionManager {
    /// Create a session manager.
    pub fn new(codec: TokenCodec, valid_for: Duration, secure: bool) -> Self {
        Self {
            codec,
            valid_for,
            secure,
        }
    }

    /// Build a session manager from the `[auth]` configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let codec = TokenCodec::new(&config.jwt_secret)
            .map_err(|e| ModulistError::Config(e.to_string()))?;
        let valid_for = i64::try_from(config.session_validity_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                ModulistError::Config("session_validity_secs is out of range".to_string())
            })?;
        Ok(Self::new(codec, valid_for, config.secure_cookies))
    }

    /// Session validity window.
    pub fn valid_for(&self) -> Duration {
        self.valid_for
    }

    /// Mint a token for the principal and wrap it in a session cookie.
    pub fn issue(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> std::result::Result<Cookie<'static>, TokenError> {
        let token = self.codec.mint(&principal.mail, now, self.valid_for)?;

        Ok(Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(self.valid_for.num_seconds()))
            .build())
    }

    /// Read the session cookie and return the verified subject.
    pub fn read(
        &self,
        jar: &CookieJar,
        now: DateTime<Utc>,
    ) -> std::result::Result<String, SessionError> {
        let cookie = jar.get(SESSION_COOKIE).ok_or(SessionError::NoSession)?;
        if cookie.value().is_empty() {
            return Err(SessionError::NoSession);
        }

        let claims = self.codec.verify(cookie.value(), now).map_err(|e| {
            debug!("Session rejected: {}", e);
            SessionError::InvalidSession
        })?;

        Ok(claims.iss)
    }

    /// Cookie that makes the client drop its session immediately.
    pub fn destroy(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .build();
        cookie.make_removal();
        cookie
    }
}
