//! Admin handlers for account management.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use std::sync::Arc;

use crate::auth::{
    create_account, deactivate_account, delete_account, reactivate_account, NewAccount,
};
use crate::db::PrincipalRepository;
use crate::web::dto::{
    AccountWithLinkResponse, ApiResponse, CreateUserRequest, MessageResponse,
    PasswordLinkResponse, UserResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AdminSession;

/// GET /admin/users - List all accounts.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
) -> Result<(CookieJar, Json<ApiResponse<Vec<UserResponse>>>), ApiError> {
    let users = PrincipalRepository::new(state.db.pool()).list_all().await?;
    let users = users.iter().map(UserResponse::from).collect();

    Ok((session.jar, Json(ApiResponse::new(users))))
}

/// POST /admin/users - Create a disabled account and its password link.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, CookieJar, Json<ApiResponse<AccountWithLinkResponse>>), ApiError> {
    let account = NewAccount {
        first_name: req.first_name,
        last_name: req.last_name,
        mail: req.mail,
        privileges: req.privileges,
    };

    let (principal, link) = create_account(
        &state.db,
        &state.hasher,
        &account,
        state.link_validity,
        Utc::now(),
    )
    .await?;

    let response = AccountWithLinkResponse {
        user: UserResponse::from(&principal),
        password_link: PasswordLinkResponse::from(&link),
    };

    Ok((
        StatusCode::CREATED,
        session.jar,
        Json(ApiResponse::new(response)),
    ))
}

/// POST /admin/users/{id}/deactivate - Disable an account.
pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    Path(id): Path<String>,
) -> Result<(CookieJar, Json<ApiResponse<UserResponse>>), ApiError> {
    let principal = deactivate_account(&state.db, &session.principal, &id).await?;

    Ok((
        session.jar,
        Json(ApiResponse::new(UserResponse::from(principal))),
    ))
}

/// POST /admin/users/{id}/activate - Reset an account and issue a new link.
pub async fn activate_user(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    Path(id): Path<String>,
) -> Result<(CookieJar, Json<ApiResponse<AccountWithLinkResponse>>), ApiError> {
    let (principal, link) = reactivate_account(
        &state.db,
        &state.hasher,
        &session.principal,
        &id,
        state.link_validity,
        Utc::now(),
    )
    .await?;

    let response = AccountWithLinkResponse {
        user: UserResponse::from(&principal),
        password_link: PasswordLinkResponse::from(&link),
    };

    Ok((session.jar, Json(ApiResponse::new(response))))
}

/// POST /admin/users/{id}/delete - Remove an account.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    Path(id): Path<String>,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    delete_account(&state.db, &session.principal, &id).await?;

    Ok((
        session.jar,
        Json(ApiResponse::new(MessageResponse::new("User deleted"))),
    ))
}
