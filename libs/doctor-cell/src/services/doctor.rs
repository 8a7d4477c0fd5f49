use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use shared_backend::{BackendClient, BackendError, Method};
use shared_config::AppConfig;
use shared_models::auth::Credential;
use shared_models::error::AppError;
use shared_models::validation::ValidationErrors;

use crate::models::{CreateDoctorProfileForm, CreatedDoctorProfile, Doctor};
use crate::services::validation::validate_profile;

const LIST_FAILED: &str = "Failed to fetch doctors list. try again later!";
const PROFILE_FAILED: &str = "Error loading doctor profile. Please try again later.";
const CREATE_FAILED: &str = "Failed to create doctor profile";

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),

    #[error("Could not load doctors: {0}")]
    ListFailed(BackendError),

    #[error("Could not load doctor profile: {0}")]
    ProfileFailed(BackendError),

    #[error("Could not create doctor profile: {0}")]
    CreateFailed(BackendError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::Invalid(errors) => AppError::InvalidFields(errors),
            DoctorError::ListFailed(e) => e.into_app_error(LIST_FAILED),
            DoctorError::ProfileFailed(BackendError::NotFound(_)) => {
                AppError::NotFound("Doctor not found".to_string())
            }
            DoctorError::ProfileFailed(e) => e.into_app_error(PROFILE_FAILED),
            DoctorError::CreateFailed(e) => e.into_app_error(CREATE_FAILED),
        }
    }
}

pub struct DoctorService {
    backend: BackendClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    /// Doctors a signed-in patient can book with.
    #[instrument(skip(self, credential))]
    pub async fn list_doctors(&self, credential: &Credential) -> Result<Vec<Doctor>, DoctorError> {
        let doctors: Vec<Doctor> = self
            .backend
            .request(Method::GET, "/patient/doctors-list", Some(credential), None)
            .await
            .map_err(DoctorError::ListFailed)?;

        debug!("Fetched {} doctors", doctors.len());
        Ok(doctors)
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, doctor_id: &str) -> Result<Doctor, DoctorError> {
        let path = format!("/doctor/doctor-profile/{}", urlencoding::encode(doctor_id));
        self.backend
            .request(Method::GET, &path, None, None)
            .await
            .map_err(DoctorError::ProfileFailed)
    }

    #[instrument(skip(self, form))]
    pub async fn create_profile(
        &self,
        user_id: &str,
        form: &CreateDoctorProfileForm,
    ) -> Result<CreatedDoctorProfile, DoctorError> {
        let request = validate_profile(form)?;

        let path = format!("/doctor/doctor-profile/{}", urlencoding::encode(user_id));
        let created: CreatedDoctorProfile = self
            .backend
            .request(Method::POST, &path, None, Some(json!(request)))
            .await
            .map_err(|e| {
                warn!("Doctor profile rejected for user {}: {}", user_id, e);
                DoctorError::CreateFailed(e)
            })?;

        info!("Created doctor profile {} for user {}", created.doctor.id, user_id);
        Ok(created)
    }
}

/// Specialty tab values, lowercased, in first-seen order.
pub fn specialty_tabs(doctors: &[Doctor]) -> Vec<String> {
    let mut tabs: Vec<String> = Vec::new();
    for doctor in doctors {
        let tab = doctor.speciality.trim().to_lowercase();
        if !tab.is_empty() && !tabs.contains(&tab) {
            tabs.push(tab);
        }
    }
    tabs
}

/// Keeps doctors in the given specialty tab; `None` or `all` keeps everyone.
pub fn filter_by_specialty(doctors: Vec<Doctor>, tab: Option<&str>) -> Vec<Doctor> {
    let tab = match tab.map(str::trim) {
        None | Some("") => return doctors,
        Some(tab) if tab.eq_ignore_ascii_case("all") => return doctors,
        Some(tab) => tab.to_lowercase(),
    };

    doctors
        .into_iter()
        .filter(|doctor| doctor.speciality.trim().to_lowercase() == tab)
        .collect()
}
