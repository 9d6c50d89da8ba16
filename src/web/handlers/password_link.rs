//! Password link handlers.
//!
//! Both endpoints are public: the secret in the path is the credential.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::auth::{complete_password_link, PasswordLinkIssuer};
use crate::db::{PasswordLinkRepository, PrincipalRepository};
use crate::web::dto::{
    ApiResponse, MessageResponse, PasswordLinkInfo, SetPasswordRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// GET /password-link/{secret} - Show whom a link belongs to.
pub async fn show_password_link(
    State(state): State<Arc<AppState>>,
    Path(secret): Path<String>,
) -> Result<Json<ApiResponse<PasswordLinkInfo>>, ApiError> {
    let store = PasswordLinkRepository::new(state.db.pool());
    let link = PasswordLinkIssuer::new(&store)
        .resolve(&secret, Utc::now())
        .await?;

    let owner = PrincipalRepository::new(state.db.pool())
        .get_by_id(&link.user_id)
        .await?
        .ok_or_else(ApiError::invalid_link)?;

    Ok(Json(ApiResponse::new(PasswordLinkInfo {
        mail: owner.mail,
        expires_at: link.expires_at,
    })))
}

/// POST /password-link/{secret} - Set the password and consume the link.
pub async fn submit_password_link(
    State(state): State<Arc<AppState>>,
    Path(secret): Path<String>,
    ValidatedJson(req): ValidatedJson<SetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    complete_password_link(
        &state.db,
        &state.hasher,
        &secret,
        &req.password,
        &req.repeat_password,
        Utc::now(),
    )
    .await?;

    Ok(Json(ApiResponse::new(MessageResponse::new(
        "Password set, you can now log in",
    ))))
}
