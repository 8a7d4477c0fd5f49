use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use shared_backend::{BackendClient, BackendError, Method};
use shared_config::AppConfig;
use shared_models::auth::Credential;

use crate::models::{AppointmentRequest, AvailabilityPayload, AvailabilityRecord};

#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    async fn load_availability(
        &self,
        doctor_id: &str,
        credential: &Credential,
    ) -> Result<Vec<AvailabilityRecord>, BackendError>;
}

#[async_trait]
pub trait AppointmentWriter: Send + Sync {
    async fn create_appointment(
        &self,
        doctor_id: &str,
        request: &AppointmentRequest,
        credential: &Credential,
    ) -> Result<Value, BackendError>;
}

pub trait BookingBackend: AvailabilityProvider + AppointmentWriter {}

impl<T: AvailabilityProvider + AppointmentWriter> BookingBackend for T {}

/// Availability and booking calls against the clinic backend.
#[derive(Clone)]
pub struct BookingService {
    backend: BackendClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    fn doctor_path(prefix: &str, doctor_id: &str) -> String {
        format!("{}/{}", prefix, urlencoding::encode(doctor_id))
    }
}

#[async_trait]
impl AvailabilityProvider for BookingService {
    #[instrument(skip(self, credential))]
    async fn load_availability(
        &self,
        doctor_id: &str,
        credential: &Credential,
    ) -> Result<Vec<AvailabilityRecord>, BackendError> {
        let path = Self::doctor_path("/appointment/select-appointment-slot", doctor_id);
        let payload: AvailabilityPayload = self
            .backend
            .request(Method::GET, &path, Some(credential), None)
            .await?;

        let records = payload.into_records();
        debug!("Backend listed {} availability records", records.len());
        Ok(records)
    }
}

#[async_trait]
impl AppointmentWriter for BookingService {
    #[instrument(skip(self, request, credential), fields(date = %request.date))]
    async fn create_appointment(
        &self,
        doctor_id: &str,
        request: &AppointmentRequest,
        credential: &Credential,
    ) -> Result<Value, BackendError> {
        let path = Self::doctor_path("/appointment/create-appointment", doctor_id);
        self.backend
            .request(Method::POST, &path, Some(credential), Some(json!(request)))
            .await
    }
}
