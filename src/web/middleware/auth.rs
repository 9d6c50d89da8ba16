//! Session extractor for guarded handlers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use std::sync::Arc;

use crate::auth::AuthorizationGate;
use crate::db::{Principal, PrincipalRepository, PrivilegeRank};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// An authorized caller whose rank is at most `RANK`.
///
/// Extraction runs the authorization gate and then re-issues the session
/// cookie. Handlers return `jar` so the refreshed cookie reaches the
/// client and the session expiry slides forward.
#[derive(Debug)]
pub struct Authorized<const RANK: i64> {
    /// The resolved caller.
    pub principal: Principal,
    /// Cookie jar holding the refreshed session cookie.
    pub jar: CookieJar,
}

/// Caller with administrator rank.
pub type AdminSession = Authorized<0>;

/// Caller with reviewer rank or better.
pub type ReviewerSession = Authorized<1>;

#[async_trait]
impl<const RANK: i64> FromRequestParts<Arc<AppState>> for Authorized<RANK> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let now = Utc::now();

        let directory = PrincipalRepository::new(state.db.pool());
        let principal = AuthorizationGate::new(&state.sessions, &directory)
            .authorize(&jar, PrivilegeRank(RANK), now)
            .await?;

        let refreshed = state.sessions.issue(&principal, now)?;

        Ok(Self {
            principal,
            jar: jar.add(refreshed),
        })
    }
}
