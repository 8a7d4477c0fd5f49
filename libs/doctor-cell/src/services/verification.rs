use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use shared_backend::{BackendClient, BackendError, Method};
use shared_config::AppConfig;
use shared_models::auth::Credential;

use crate::models::{Doctor, VerificationCounts, VerificationQuery, VerificationStatus};

// The backend serves the dashboard listing under this spelling.
const VERIFICATIONS_PATH: &str = "/admin/dcotor-profile-with-doctor-verifications/";

pub struct VerificationService {
    backend: BackendClient,
}

impl VerificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    /// Every doctor profile together with its verification requests.
    #[instrument(skip(self, credential))]
    pub async fn list_profiles(&self, credential: &Credential) -> Result<Vec<Doctor>, BackendError> {
        let doctors: Vec<Doctor> = self
            .backend
            .request(Method::GET, VERIFICATIONS_PATH, Some(credential), None)
            .await?;

        debug!("Fetched {} doctor profiles for review", doctors.len());
        Ok(doctors)
    }

    #[instrument(skip(self, credential))]
    pub async fn set_status(
        &self,
        verification_id: i64,
        status: VerificationStatus,
        credential: &Credential,
    ) -> Result<Value, BackendError> {
        let path = format!("/admin/doctor-verification/{}", verification_id);
        let result = self
            .backend
            .request(
                Method::PATCH,
                &path,
                Some(credential),
                Some(json!({ "status": status.as_str() })),
            )
            .await?;

        info!("Verification {} set to {}", verification_id, status.as_str());
        Ok(result)
    }
}

/// Dashboard filters; unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct VerificationFilter {
    pub search: Option<String>,
    pub status: Option<VerificationStatus>,
    pub specialty: Option<String>,
}

impl VerificationFilter {
    /// Reads the query string; `all` and blank values disable a filter.
    pub fn from_query(query: &VerificationQuery) -> Self {
        fn active(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
                .map(str::to_string)
        }

        Self {
            search: active(&query.search).map(|s| s.to_lowercase()),
            status: active(&query.status).map(|s| {
                VerificationStatus::parse(&s).unwrap_or(VerificationStatus::Unknown)
            }),
            specialty: active(&query.specialty),
        }
    }

    pub fn matches(&self, doctor: &Doctor) -> bool {
        if let Some(term) = &self.search {
            let hit = [doctor.name(), doctor.email(), Some(doctor.speciality.as_str())]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(term.as_str()));
            if !hit {
                return false;
            }
        }

        if let Some(status) = self.status {
            if !doctor.verifications.iter().any(|v| v.status == status) {
                return false;
            }
        }

        match &self.specialty {
            Some(specialty) => doctor.speciality == *specialty,
            None => true,
        }
    }

    pub fn apply(&self, doctors: Vec<Doctor>) -> Vec<Doctor> {
        doctors.into_iter().filter(|d| self.matches(d)).collect()
    }
}

/// Specialties as the backend spells them, in first-seen order.
pub fn unique_specialties(doctors: &[Doctor]) -> Vec<String> {
    let mut specialties: Vec<String> = Vec::new();
    for doctor in doctors {
        if !specialties.contains(&doctor.speciality) {
            specialties.push(doctor.speciality.clone());
        }
    }
    specialties
}

/// Totals by the status of each profile's first verification.
pub fn status_counts(doctors: &[Doctor]) -> VerificationCounts {
    doctors
        .iter()
        .fold(VerificationCounts::default(), |mut counts, doctor| {
            match doctor.verification_status() {
                VerificationStatus::Pending => counts.pending += 1,
                VerificationStatus::Verified => counts.verified += 1,
                VerificationStatus::Rejected => counts.rejected += 1,
                VerificationStatus::Unknown => {}
            }
            counts
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profiles() -> Vec<Doctor> {
        serde_json::from_value(json!([
            {
                "id": 1,
                "speciality": "Cardiology",
                "user": { "name": "Gregory House", "email": "house@clinic.test" },
                "DoctorVerification": [{ "id": 10, "status": "pending" }]
            },
            {
                "id": 2,
                "speciality": "Dermatology",
                "user": { "name": "Lisa Cuddy", "email": "cuddy@clinic.test" },
                "DoctorVerification": [{ "id": 20, "status": "approved" }]
            },
            {
                "id": 3,
                "speciality": "Cardiology",
                "user": { "name": "James Wilson", "email": "wilson@clinic.test" },
                "DoctorVerification": [{ "id": 30, "status": "rejected" }, { "id": 31, "status": "pending" }]
            },
            { "id": 4, "speciality": "Oncology" }
        ]))
        .unwrap()
    }

    fn ids(doctors: &[Doctor]) -> Vec<i64> {
        doctors.iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_search_covers_name_email_and_specialty() {
        let filter = VerificationFilter::from_query(&VerificationQuery {
            search: Some("CUDDY".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&filter.apply(profiles())), vec![2]);

        let filter = VerificationFilter::from_query(&VerificationQuery {
            search: Some("cardio".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&filter.apply(profiles())), vec![1, 3]);
    }

    #[test]
    fn test_status_filter_checks_every_verification() {
        let filter = VerificationFilter::from_query(&VerificationQuery {
            status: Some("pending".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&filter.apply(profiles())), vec![1, 3]);
    }

    #[test]
    fn test_all_disables_filters() {
        let filter = VerificationFilter::from_query(&VerificationQuery {
            search: Some("  ".to_string()),
            status: Some("all".to_string()),
            specialty: Some("all".to_string()),
        });
        assert_eq!(filter.apply(profiles()).len(), 4);
    }

    #[test]
    fn test_specialty_filter_is_exact() {
        let filter = VerificationFilter::from_query(&VerificationQuery {
            specialty: Some("Cardiology".to_string()),
            ..Default::default()
        });
        assert_eq!(ids(&filter.apply(profiles())), vec![1, 3]);

        let filter = VerificationFilter::from_query(&VerificationQuery {
            specialty: Some("cardiology".to_string()),
            ..Default::default()
        });
        assert!(filter.apply(profiles()).is_empty());
    }

    #[test]
    fn test_counts_use_first_verification() {
        let counts = status_counts(&profiles());
        assert_eq!(
            counts,
            VerificationCounts {
                pending: 1,
                verified: 1,
                rejected: 1
            }
        );
        assert_eq!(unique_specialties(&profiles()), vec!["Cardiology", "Dermatology", "Oncology"]);
    }
}
