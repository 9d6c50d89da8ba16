//! Configuration module for MODULIST.
//!
//! Configuration is read once at startup from a TOML file, optionally
//! overridden by environment variables, and then treated as immutable.

use serde::Deserialize;
use std::path::Path;

use crate::{ModulistError, Result};

/// Environment variable overriding `auth.jwt_secret`.
pub const ENV_JWT_SECRET: &str = "MODULIST_JWT_SECRET";

/// Environment variable overriding `database.path`.
pub const ENV_DATABASE_PATH: &str = "MODULIST_DATABASE_PATH";

/// Upper bound for `auth.session_validity_secs` (30 days).
pub const MAX_SESSION_VALIDITY_SECS: u64 = 30 * 24 * 60 * 60;

/// Upper bound for `auth.password_link_validity_days`.
pub const MAX_LINK_VALIDITY_DAYS: u64 = 365;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/modulist.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/modulist.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Session, password link and credential hashing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Symmetric key used to sign session tokens (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Session token validity in seconds.
    #[serde(default = "default_session_validity")]
    pub session_validity_secs: u64,
    /// Password link validity in days.
    #[serde(default = "default_link_validity")]
    pub password_link_validity_days: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2 time cost (iterations).
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    /// Argon2 parallelism.
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
    /// Mark the session cookie as TLS-only.
    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_session_validity() -> u64 {
    3600
}

fn default_link_validity() -> u64 {
    5
}

fn default_hash_memory() -> u32 {
    65536
}

fn default_hash_iterations() -> u32 {
    3
}

fn default_hash_parallelism() -> u32 {
    4
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            session_validity_secs: default_session_validity(),
            password_link_validity_days: default_link_validity(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
            secure_cookies: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ModulistError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Like `load_with_env`, but a missing file yields the defaults plus
    /// environment overrides. Unreadable or malformed files are errors.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load_with_env(path) {
            Err(ModulistError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Self::default();
                config.apply_env_overrides();
                Ok(config)
            }
            other => other,
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ModulistError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var(ENV_JWT_SECRET) {
            if !secret.is_empty() {
                self.auth.jwt_secret = secret;
            }
        }
        if let Ok(path) = std::env::var(ENV_DATABASE_PATH) {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// A missing signing secret is fatal: the process must not start
    /// without one.
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()
    }
}

impl AuthConfig {
    /// Check the signing secret, validity windows and hash parameters.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            return Err(ModulistError::Config(format!(
                "jwt_secret is not set. Set it in config.toml or via {ENV_JWT_SECRET}."
            )));
        }
        if !(1..=MAX_SESSION_VALIDITY_SECS).contains(&self.session_validity_secs) {
            return Err(ModulistError::Config(format!(
                "session_validity_secs must be between 1 and {MAX_SESSION_VALIDITY_SECS}"
            )));
        }
        if !(1..=MAX_LINK_VALIDITY_DAYS).contains(&self.password_link_validity_days) {
            return Err(ModulistError::Config(format!(
                "password_link_validity_days must be between 1 and {MAX_LINK_VALIDITY_DAYS}"
            )));
        }
        argon2::Params::new(
            self.hash_memory_kib,
            self.hash_iterations,
            self.hash_parallelism,
            None,
        )
        .map_err(|e| ModulistError::Config(format!("invalid hash parameters: {e}")))?;
        Ok(())
    }
}
