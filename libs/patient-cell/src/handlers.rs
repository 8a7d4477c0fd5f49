use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::Credential;
use shared_models::error::AppError;

use crate::services::patient::PROFILE_FAILED;
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn get_patient_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(credential): Extension<Credential>,
) -> Result<Json<Value>, AppError> {
    let profile = PatientService::new(&config)
        .get_profile(&credential)
        .await
        .map_err(|e| e.into_app_error(PROFILE_FAILED))?;

    Ok(Json(json!({
        "display": profile.display(),
        "profile": profile
    })))
}
