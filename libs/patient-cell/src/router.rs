use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::credential_middleware;

use crate::handlers;

pub fn patient_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/profile", get(handlers::get_patient_profile))
        .layer(middleware::from_fn(credential_middleware))
        .with_state(config)
}
