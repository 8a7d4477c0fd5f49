use tracing::{debug, instrument};

use shared_backend::{BackendClient, BackendError, Method};
use shared_config::AppConfig;
use shared_models::auth::Credential;

use crate::models::UserProfile;

pub const PROFILE_FAILED: &str = "Error loading profile";

pub struct PatientService {
    backend: BackendClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    /// Profile of whoever the credential belongs to.
    #[instrument(skip(self, credential))]
    pub async fn get_profile(&self, credential: &Credential) -> Result<UserProfile, BackendError> {
        let profile: UserProfile = self
            .backend
            .request(Method::GET, "/users/user-profile", Some(credential), None)
            .await?;

        debug!("Loaded profile for user {}", profile.id);
        Ok(profile)
    }
}
