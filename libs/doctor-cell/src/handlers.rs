use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::Credential;
use shared_models::error::AppError;

use crate::models::{
    CreateDoctorProfileForm, DoctorListQuery, UpdateVerificationRequest, VerificationQuery,
    VerificationStatus,
};
use crate::services::doctor::{filter_by_specialty, specialty_tabs};
use crate::services::verification::{status_counts, unique_specialties};
use crate::services::{DoctorService, VerificationFilter, VerificationService};

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor_profile(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&config).get_profile(&doctor_id).await?;
    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn create_doctor_profile(
    State(config): State<Arc<AppConfig>>,
    Path(user_id): Path<String>,
    Json(form): Json<CreateDoctorProfileForm>,
) -> Result<Json<Value>, AppError> {
    let created = DoctorService::new(&config).create_profile(&user_id, &form).await?;

    Ok(Json(json!({
        "message": "Doctor profile created successfully",
        "doctor_id": created.doctor.id,
        "next_route": created.profile_route()
    })))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
    Extension(credential): Extension<Credential>,
    Query(query): Query<DoctorListQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(&config).list_doctors(&credential).await?;
    let specialties = specialty_tabs(&doctors);
    let doctors = filter_by_specialty(doctors, query.specialty.as_deref());

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len(),
        "specialties": specialties,
        "specialty": query.specialty.unwrap_or_else(|| "all".to_string())
    })))
}

#[axum::debug_handler]
pub async fn list_verifications(
    State(config): State<Arc<AppConfig>>,
    Extension(credential): Extension<Credential>,
    Query(query): Query<VerificationQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = VerificationService::new(&config)
        .list_profiles(&credential)
        .await
        .map_err(|e| {
            e.into_app_error("Error loading doctor profile with doctor verification. Please try again later.")
        })?;

    let specialties = unique_specialties(&doctors);
    let counts = status_counts(&doctors);
    let filtered = VerificationFilter::from_query(&query).apply(doctors);

    Ok(Json(json!({
        "doctors": filtered,
        "total": filtered.len(),
        "specialties": specialties,
        "counts": counts
    })))
}

#[axum::debug_handler]
pub async fn update_verification(
    State(config): State<Arc<AppConfig>>,
    Extension(credential): Extension<Credential>,
    Path(verification_id): Path<i64>,
    Json(request): Json<UpdateVerificationRequest>,
) -> Result<Json<Value>, AppError> {
    let status = request.status;
    if status == VerificationStatus::Unknown {
        return Err(AppError::ValidationError(
            "status must be one of pending, verified, rejected".to_string(),
        ));
    }

    let result = VerificationService::new(&config)
        .set_status(verification_id, status, &credential)
        .await
        .map_err(|e| e.into_app_error("Failed to update verification status"))?;

    Ok(Json(json!({
        "message": format!("Doctor marked as {}", status.label()),
        "verification_id": verification_id,
        "status": status,
        "result": result
    })))
}
