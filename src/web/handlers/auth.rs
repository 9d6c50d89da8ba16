//! Authentication handlers.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::auth::{authenticate, CredentialHasher, SessionManager};
use crate::config::AuthConfig;
use crate::db::PrincipalRepository;
use crate::web::dto::{ApiResponse, LoginRequest, MessageResponse, UserResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::{Database, ModulistError};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Session cookie issuer.
    pub sessions: SessionManager,
    /// Credential hasher.
    pub hasher: CredentialHasher,
    /// Validity of newly issued password links.
    pub link_validity: Duration,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: Database,
        sessions: SessionManager,
        hasher: CredentialHasher,
        link_validity: Duration,
    ) -> Self {
        Self {
            db,
            sessions,
            hasher,
            link_validity,
        }
    }

    /// Build the state from the `[auth]` configuration.
    pub fn from_config(db: Database, config: &AuthConfig) -> crate::Result<Self> {
        config.validate()?;
        let sessions = SessionManager::from_config(config)?;
        let hasher = CredentialHasher::from_config(config)
            .map_err(|e| ModulistError::Config(e.to_string()))?;
        let link_validity = i64::try_from(config.password_link_validity_days)
            .ok()
            .and_then(Duration::try_days)
            .ok_or_else(|| {
                ModulistError::Config("password_link_validity_days is out of range".to_string())
            })?;
        Ok(Self::new(db, sessions, hasher, link_validity))
    }
}

/// POST /login - Check credentials and start a session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<UserResponse>>), ApiError> {
    let repo = PrincipalRepository::new(state.db.pool());
    let principal = authenticate(&repo, &req.mail, &req.password).await?;

    let cookie = state.sessions.issue(&principal, Utc::now())?;

    Ok((
        jar.add(cookie),
        Json(ApiResponse::new(UserResponse::from(principal))),
    ))
}

/// GET /logout - Drop the session cookie.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<MessageResponse>>) {
    tracing::info!("User logged out");
    (
        jar.add(state.sessions.destroy()),
        Json(ApiResponse::new(MessageResponse::new("Logged out"))),
    )
}
