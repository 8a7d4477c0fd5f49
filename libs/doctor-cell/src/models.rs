use serde::{Deserialize, Serialize};

use shared_models::validation::text_or_number;

// ==============================================================================
// DOCTOR PROFILE (as the backend returns it)
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorUser {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Qualification {
    pub qualification_name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub course_duration: String,
    #[serde(default)]
    pub year_completed: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicInfo {
    pub clinic_name: String,
    #[serde(default)]
    pub clinic_phone: Option<String>,
    #[serde(default = "default_primary")]
    pub is_primary_location: bool,
    #[serde(default)]
    pub consultation_hours_notes: Option<String>,
}

fn default_primary() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicAddress {
    pub street_address: String,
    #[serde(default)]
    pub area_name: Option<String>,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub pincode: Option<i64>,
    pub country: String,
    #[serde(default = "default_address_type")]
    pub address_type: String,
}

fn default_address_type() -> String {
    "other".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    #[serde(default)]
    pub clinic_info: Option<ClinicInfo>,
    #[serde(default)]
    pub clinic_address: Option<ClinicAddress>,
}

/// Verification state of a doctor profile. Approval goes out as `verified`;
/// `approved` is still read as the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    #[serde(alias = "approved")]
    Verified,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl VerificationStatus {
    pub fn parse(status: &str) -> Option<Self> {
        match status.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(VerificationStatus::Pending),
            "verified" | "approved" => Some(VerificationStatus::Verified),
            "rejected" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
            VerificationStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "Pending",
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Rejected => "Rejected",
            VerificationStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorVerification {
    pub id: i64,
    pub status: VerificationStatus,
    #[serde(default)]
    pub requested_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    #[serde(default)]
    pub speciality: String,
    #[serde(default)]
    pub experience: Option<i64>,
    #[serde(default)]
    pub consultation_fee: Option<f64>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub user: Option<DoctorUser>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
    #[serde(default)]
    pub clinics: Vec<Clinic>,
    #[serde(rename = "DoctorVerification", default)]
    pub verifications: Vec<DoctorVerification>,
}

impl Doctor {
    pub fn name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.name.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.email.as_deref())
    }

    pub fn primary_clinic(&self) -> Option<&Clinic> {
        self.clinics.first()
    }

    pub fn clinic_name(&self) -> &str {
        self.primary_clinic()
            .and_then(|c| c.clinic_info.as_ref())
            .map(|info| info.clinic_name.as_str())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Not Available")
    }

    /// The verification the dashboard shows: the first one on the profile.
    pub fn latest_verification(&self) -> Option<&DoctorVerification> {
        self.verifications.first()
    }

    pub fn verification_status(&self) -> VerificationStatus {
        self.latest_verification()
            .map(|v| v.status)
            .unwrap_or(VerificationStatus::Unknown)
    }
}

// ==============================================================================
// QUERIES
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorListQuery {
    /// Specialty tab; absent or `all` shows every doctor.
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateVerificationRequest {
    pub status: VerificationStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerificationCounts {
    pub pending: usize,
    pub verified: usize,
    pub rejected: usize,
}

// ==============================================================================
// PROFILE CREATION
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorSectionForm {
    #[serde(default)]
    pub speciality: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub experience: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub consultation_fee: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QualificationForm {
    #[serde(default)]
    pub qualification_name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub course_duration: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub year_completed: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstituteForm {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_institute_type")]
    pub kind: String,
}

impl Default for InstituteForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: default_institute_type(),
        }
    }
}

fn default_institute_type() -> String {
    "university".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClinicInfoForm {
    #[serde(default)]
    pub clinic_name: String,
    #[serde(default)]
    pub clinic_phone: String,
    #[serde(default = "default_primary")]
    pub is_primary_location: bool,
    #[serde(default)]
    pub consultation_hours_notes: String,
}

impl Default for ClinicInfoForm {
    fn default() -> Self {
        Self {
            clinic_name: String::new(),
            clinic_phone: String::new(),
            is_primary_location: true,
            consultation_hours_notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClinicAddressForm {
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub area_name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub pincode: String,
    #[serde(default)]
    pub country: String,
    #[serde(default = "default_address_type")]
    pub address_type: String,
}

impl Default for ClinicAddressForm {
    fn default() -> Self {
        Self {
            street_address: String::new(),
            area_name: String::new(),
            city: String::new(),
            state: String::new(),
            pincode: String::new(),
            country: String::new(),
            address_type: default_address_type(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClinicWithAddressForm {
    #[serde(default)]
    pub clinic_info: ClinicInfoForm,
    #[serde(default)]
    pub clinic_address: ClinicAddressForm,
}

/// The multi-step profile form, every field as the browser typed it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDoctorProfileForm {
    #[serde(default)]
    pub doctor: DoctorSectionForm,
    #[serde(default)]
    pub qualification: QualificationForm,
    #[serde(default)]
    pub institute: InstituteForm,
    #[serde(default)]
    pub doctor_clinic_with_address: ClinicWithAddressForm,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDetails {
    pub speciality: String,
    pub experience: i64,
    pub consultation_fee: f64,
    pub bio: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QualificationDetails {
    pub qualification_name: String,
    pub course_duration: String,
    pub year_completed: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstituteDetails {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClinicWithAddress {
    pub clinic_info: ClinicInfo,
    pub clinic_address: ClinicAddress,
}

/// Body of `POST /doctor/doctor-profile/{user_id}`, numbers converted.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDoctorProfileRequest {
    pub doctor: DoctorDetails,
    pub qualification: QualificationDetails,
    pub institute: InstituteDetails,
    pub doctor_clinic_with_address: ClinicWithAddress,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedDoctorRef {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedDoctorProfile {
    pub doctor: CreatedDoctorRef,
}

impl CreatedDoctorProfile {
    pub fn profile_route(&self) -> String {
        format!("/doctor-profile/{}", self.doctor.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_utils::test_utils::MockBackendResponses;

    #[test]
    fn test_doctor_from_backend_listing() {
        let doctor: Doctor =
            serde_json::from_value(MockBackendResponses::doctor_response(4, "Gregory House", "Cardiology"))
                .unwrap();

        assert_eq!(doctor.name(), Some("Gregory House"));
        assert_eq!(doctor.clinic_name(), "City Care");
        assert_eq!(doctor.qualifications[0].course_duration, "5");
        assert_eq!(doctor.verification_status(), VerificationStatus::Unknown);
    }

    #[test]
    fn test_clinic_name_falls_back() {
        let doctor: Doctor = serde_json::from_value(json!({ "id": 1, "speciality": "ENT" })).unwrap();
        assert_eq!(doctor.clinic_name(), "Not Available");
        assert!(doctor.user.is_none());
    }

    #[test]
    fn test_latest_verification_decides_status() {
        let doctor: Doctor = serde_json::from_value(json!({
            "id": 2,
            "speciality": "Dermatology",
            "DoctorVerification": [
                { "id": 11, "status": "verified", "requested_at": "2025-06-01T10:00:00" },
                { "id": 10, "status": "rejected" }
            ]
        }))
        .unwrap();

        assert_eq!(doctor.verification_status(), VerificationStatus::Verified);
        assert_eq!(doctor.latest_verification().map(|v| v.id), Some(11));
    }

    #[test]
    fn test_unrecognized_status_is_unknown() {
        let status: VerificationStatus = serde_json::from_value(json!("on_hold")).unwrap();
        assert_eq!(status, VerificationStatus::Unknown);
        let approved: VerificationStatus = serde_json::from_value(json!("approved")).unwrap();
        assert_eq!(approved, VerificationStatus::Verified);
        assert_eq!(json!(approved), json!("verified"));
        assert_eq!(VerificationStatus::parse("Verified"), Some(VerificationStatus::Verified));
        assert_eq!(VerificationStatus::parse("on_hold"), None);
    }

    #[test]
    fn test_profile_form_defaults() {
        let form: CreateDoctorProfileForm = serde_json::from_value(json!({
            "doctor": { "speciality": "Cardiology", "experience": 5 }
        }))
        .unwrap();

        assert_eq!(form.doctor.experience, "5");
        assert_eq!(form.institute.kind, "university");
        assert_eq!(form.doctor_clinic_with_address.clinic_address.address_type, "other");
        assert!(form.doctor_clinic_with_address.clinic_info.is_primary_location);
    }
}
