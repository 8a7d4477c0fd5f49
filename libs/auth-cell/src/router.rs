use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

/// Expects `SessionContext` and `PortalNavigator` extensions from the app.
pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/register", post(handlers::register))
        .route("/session", get(handlers::session_status))
        .with_state(state)
}
