//! Self-service settings handlers.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use std::sync::Arc;

use crate::auth::change_password as change_own_password;
use crate::web::dto::{
    ApiResponse, ChangePasswordRequest, MessageResponse, UserResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::ReviewerSession;

/// GET /settings - The caller's own account.
pub async fn get_settings(session: ReviewerSession) -> (CookieJar, Json<ApiResponse<UserResponse>>) {
    let user = UserResponse::from(&session.principal);
    (session.jar, Json(ApiResponse::new(user)))
}

/// POST /settings/password - Change the caller's password.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    session: ReviewerSession,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    let updated = change_own_password(
        &state.db,
        &state.hasher,
        &session.principal,
        &req.old_password,
        &req.new_password,
        &req.repeat_new_password,
    )
    .await?;

    let cookie = state.sessions.issue(&updated, Utc::now())?;

    Ok((
        session.jar.add(cookie),
        Json(ApiResponse::new(MessageResponse::new("Password changed"))),
    ))
}
