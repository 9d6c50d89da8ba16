//! Signed session tokens.
//!
//! Tokens are HS512 JWTs carrying a fixed claim set. Verification takes
//! the current time as an argument so that validity is a pure function of
//! the token, the key and `now`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only accepted signing algorithm.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

/// Clock skew tolerance applied to `nbf`.
pub const NOT_BEFORE_SKEW_SECS: i64 = 60;

/// Token errors.
///
/// `Invalid` deliberately does not say which check failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// No signing key configured.
    #[error("signing secret is not configured")]
    MissingSecret,

    /// The token is malformed, forged, or outside its validity window.
    #[error("invalid or expired token")]
    Invalid,

    /// Encoding the token failed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Session token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer: the principal's contact address, used as subject.
    pub iss: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Not before (unix seconds).
    pub nbf: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl Claims {
    /// Build the claim set for a token issued at `issued_at`.
    pub fn new(subject: impl Into<String>, issued_at: DateTime<Utc>, valid_for: Duration) -> Self {
        let iat = issued_at.timestamp();
        Self {
            iss: subject.into(),
            iat,
            nbf: iat - NOT_BEFORE_SKEW_SECS,
            exp: iat.saturating_add(valid_for.num_seconds()),
        }
    }

    /// The subject (contact address) this token was issued for.
    pub fn subject(&self) -> &str {
        &self.iss
    }

    /// Check `nbf <= now <= exp`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        self.nbf <= now && now <= self.exp
    }
}

/// Creates and verifies signed tokens with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec from the signing secret.
    ///
    /// Fails with `MissingSecret` if the secret is empty; callers treat
    /// this as a startup error.
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        // Time checks happen in `verify` against the caller's clock.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["iss", "iat", "nbf", "exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Mint a token for `subject` issued at `issued_at`.
    pub fn mint(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
        valid_for: Duration,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(subject, issued_at, valid_for);
        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token at time `now` and return its claims.
    ///
    /// Rejects tokens signed with any algorithm other than HS512, tokens
    /// with a bad signature, and tokens outside `[nbf, exp]`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            TokenError::Invalid
        })?;

        if !data.claims.is_valid_at(now) {
            tracing::debug!(
                nbf = data.claims.nbf,
                exp = data.claims.exp,
                now = now.timestamp(),
                "Token rejected: outside validity window"
            );
            return Err(TokenError::Invalid);
        }

        Ok(data.claims)
    }
}
