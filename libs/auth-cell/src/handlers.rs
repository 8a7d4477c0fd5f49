use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::SessionContext;

use crate::guard::PortalNavigator;
use crate::models::{LoginForm, RegistrationForm, SessionStatus};
use crate::services::AuthService;

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Extension(navigator): Extension<PortalNavigator>,
    Json(form): Json<LoginForm>,
) -> Result<Json<Value>, AppError> {
    let service = AuthService::new(&config);
    let user = service.sign_in(&form, &session).await?;

    navigator.clear();

    Ok(Json(json!({
        "message": "Login successful",
        "user": user,
        "redirect": "/"
    })))
}

#[axum::debug_handler]
pub async fn logout(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Value>, AppError> {
    AuthService::new(&config).sign_out(&session).await?;

    Ok(Json(json!({ "message": "Logged out" })))
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(form): Json<RegistrationForm>,
) -> Result<Json<Value>, AppError> {
    let user = AuthService::new(&config).register(&form).await?;
    let next_route = user.next_route();

    Ok(Json(json!({
        "message": "Registration successful",
        "user": user,
        "next_route": next_route
    })))
}

pub async fn session_status(
    Extension(session): Extension<SessionContext>,
    Extension(navigator): Extension<PortalNavigator>,
) -> Json<SessionStatus> {
    debug!("Reporting session status");

    Json(SessionStatus {
        initializing: session.is_initializing(),
        logged_in: session.is_logged_in(),
        user: session.current_user(),
        redirect: navigator.pending_route(),
    })
}
