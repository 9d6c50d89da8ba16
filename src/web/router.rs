//! Router configuration for the web API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    activate_user, change_password, create_user, deactivate_user, delete_user, get_settings,
    list_users, login, logout, show_password_link, submit_password_link, AppState,
};

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let session_routes = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout));

    let admin_routes = Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id/deactivate", post(deactivate_user))
        .route("/users/:id/activate", post(activate_user))
        .route("/users/:id/delete", post(delete_user));

    let settings_routes = Router::new()
        .route("/", get(get_settings))
        .route("/password", post(change_password));

    let link_routes = Router::new().route(
        "/:secret",
        get(show_password_link).post(submit_password_link),
    );

    Router::new()
        .merge(session_routes)
        .nest("/admin", admin_routes)
        .nest("/settings", settings_routes)
        .nest("/password-link", link_routes)
        .merge(create_health_router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router<S: Clone + Send + Sync + 'static>() -> Router<S> {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
