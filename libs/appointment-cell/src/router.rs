use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::credential_middleware;

use crate::handlers;

/// Booking pages resolve their own credential so a signed-out visit can
/// schedule the sign-in redirect.
pub fn booking_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/{doctor_id}", post(handlers::book_slot))
        .route("/{doctor_id}/calendar", get(handlers::get_calendar))
        .route("/{doctor_id}/slots", get(handlers::get_slots))
        .with_state(state)
}

pub fn appointment_list_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/patient", get(handlers::get_patient_appointments))
        .route("/doctor", get(handlers::get_doctor_appointments))
        .layer(middleware::from_fn(credential_middleware))
        .with_state(state)
}
