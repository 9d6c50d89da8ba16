//! Password hashing and validation for MODULIST.
//!
//! Uses Argon2id with parameters taken from the `[auth]` configuration.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::{OsRng, RngCore};
use thiserror::Error;

use crate::config::AuthConfig;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 16;

/// Maximum password length in characters.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Characters accepted as "special" by the password policy.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=:;?/,|";

/// Random bytes behind a placeholder hash.
const PLACEHOLDER_BYTES: usize = 24;

/// Password-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,

    /// Password contains no digit.
    #[error("password must contain at least one digit")]
    MissingDigit,

    /// Password contains no special character.
    #[error("password must contain at least one of {SPECIAL_CHARACTERS}")]
    MissingSpecial,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Password hash is invalid.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password verification failed (wrong password).
    #[error("password verification failed")]
    VerificationFailed,
}

/// Argon2id hasher with fixed cost parameters.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Create a hasher with explicit cost parameters.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Self { params })
    }

    /// Create a hasher from the `[auth]` configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, PasswordError> {
        Self::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
        )
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            self.params.clone(),
        )
    }

    /// Validate a user-chosen password and hash it.
    ///
    /// Returns a PHC-formatted string that includes salt and parameters.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        validate_password(password)?;
        self.hash_unchecked(password)
    }

    fn hash_unchecked(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Hash of a random value nobody knows.
    ///
    /// Stored for accounts that have no usable password yet.
    pub fn placeholder_hash(&self) -> Result<String, PasswordError> {
        self.hash_unchecked(&random_hex(PLACEHOLDER_BYTES))
    }
}

/// Verify a password against a stored hash.
///
/// The cost parameters are read from the stored hash, not from the
/// current configuration, so hashes survive a config change.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// Validate the password policy.
///
/// Checks:
/// - Length between 16 and 128 characters
/// - At least one ASCII digit
/// - At least one character from [`SPECIAL_CHARACTERS`]
///
/// # Examples
///
/// ```
/// use modulist::auth::validate_password;
///
/// assert!(validate_password("short1!").is_err());
/// assert!(validate_password("correct-horse-battery-9").is_ok());
/// ```
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(PasswordError::MissingSpecial);
    }
    Ok(())
}

/// Lowercase hex encoding of `bytes` random bytes from the OS.
pub(crate) fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{b:02x}")).collect()
}
