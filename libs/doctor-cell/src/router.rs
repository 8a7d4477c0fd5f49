use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::credential_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/{doctor_id}", get(handlers::get_doctor_profile))
        .route("/profile/{user_id}", post(handlers::create_doctor_profile));

    let protected_routes = Router::new()
        .route("/", get(handlers::list_doctors))
        .layer(middleware::from_fn(credential_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Verification dashboard. Role checks stay with the backend.
pub fn admin_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/verifications", get(handlers::list_verifications))
        .route("/verifications/{verification_id}", patch(handlers::update_verification))
        .layer(middleware::from_fn(credential_middleware))
        .with_state(state)
}
