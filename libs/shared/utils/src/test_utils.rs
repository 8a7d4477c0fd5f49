use std::path::PathBuf;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::CurrentUser;

pub const TEST_SIGNING_SECRET: &str = "test-secret-key-for-jwt-signing-must-be-long-enough";

pub struct TestConfig {
    pub backend_url: String,
    pub token_file: PathBuf,
    pub booking_window_days: i64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            token_file: std::env::temp_dir().join(format!("clinic-portal-test-{}", Uuid::new_v4())),
            booking_window_days: 30,
        }
    }
}

impl TestConfig {
    pub fn with_backend(backend_url: &str) -> Self {
        Self {
            backend_url: backend_url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            backend_url: self.backend_url.clone(),
            token_file: self.token_file.clone(),
            booking_window_days: self.booking_window_days,
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub name: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", "patient")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
            name: "Test User".to_string(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> CurrentUser {
        CurrentUser {
            id: self.id.clone(),
            username: self.email.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            name: Some(self.name.clone()),
            expires_at: None,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Mints an HS256 token shaped like the ones the clinic backend issues.
    pub fn create_test_token(user: &TestUser, exp_hours: Option<i64>) -> String {
        Self::create_token_expiring_in(user, Duration::hours(exp_hours.unwrap_or(24)))
    }

    pub fn create_token_expiring_in(user: &TestUser, lifetime: Duration) -> String {
        let now = Utc::now();
        let exp = now + lifetime;

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.email,
            "user_id": user.id,
            "email": user.email,
            "role": user.role,
            "name": user.name,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(TEST_SIGNING_SECRET.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser) -> String {
        Self::create_test_token(user, Some(-1))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockBackendResponses;

impl MockBackendResponses {
    /// Availability in the backend's wrapped shape, dates as `YY-MM-DD`.
    pub fn availability_response(records: &[(&str, &[&str])]) -> serde_json::Value {
        let slots: Vec<serde_json::Value> = records
            .iter()
            .map(|(date, slots)| json!({ "date": date, "time_slot": slots }))
            .collect();
        json!({ "slots": slots })
    }

    pub fn appointment_created_response(doctor_id: &str, date: &str, start: &str, end: &str) -> serde_json::Value {
        json!({
            "id": 101,
            "doctor_id": doctor_id,
            "date": date,
            "start_time": start,
            "end_time": end,
            "appointment_status": "scheduled",
            "payment_status": "pending"
        })
    }

    pub fn doctor_response(id: i64, name: &str, speciality: &str) -> serde_json::Value {
        json!({
            "id": id,
            "speciality": speciality,
            "experience": 8,
            "consultation_fee": 500.0,
            "bio": "Experienced physician",
            "is_verified": true,
            "user": {
                "id": id + 100,
                "name": name,
                "email": format!("doctor{}@clinic.test", id)
            },
            "qualifications": [
                { "qualification_name": "MBBS", "course_duration": 5, "year_completed": 2012 }
            ],
            "clinics": [{
                "clinic_info": {
                    "clinic_name": "City Care",
                    "clinic_phone": "+15550001111",
                    "is_primary_location": true,
                    "consultation_hours_notes": "Mon-Fri 9-5"
                },
                "clinic_address": {
                    "street_address": "1 Main St",
                    "area_name": "Downtown",
                    "city": "Springfield",
                    "state": "IL",
                    "pincode": 62701,
                    "country": "USA",
                    "address_type": "other"
                }
            }]
        })
    }

    pub fn appointment_response(id: i64, date: &str, start: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "date": date,
            "start_time": start,
            "end_time": "23:59",
            "appointment_status": status,
            "payment_status": "PENDING",
            "reason_for_visit": "Checkup",
            "fees": 500.0,
            "doctor": {
                "id": 4,
                "speciality": "Cardiology",
                "user": { "first_name": "Gregory", "last_name": "House" }
            },
            "patient": {
                "id": 9,
                "user": { "first_name": "Jane", "last_name": "Doe" }
            }
        })
    }

    pub fn user_profile_response(user_id: i64) -> serde_json::Value {
        json!({
            "id": user_id,
            "first_name": "Jane",
            "last_name": "Doe",
            "age": 34,
            "gender": "FEMALE",
            "mobile_no": "+15551234567",
            "gmail": "jane@clinic.test",
            "user_role": "patient",
            "patient": {
                "id": 9,
                "blood_group": "O+",
                "height": 168.0,
                "weight": null,
                "allergies": null,
                "medical_history": "Asthma",
                "emergency_contact_name": "John Doe",
                "emergency_contact_number": "+15557654321"
            }
        })
    }

    pub fn error_response(detail: &str) -> serde_json::Value {
        json!({ "detail": detail })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::with_backend("http://127.0.0.1:9999");
        let app_config = config.to_app_config();

        assert_eq!(app_config.backend_url, "http://127.0.0.1:9999");
        assert_eq!(app_config.booking_window_days, 30);
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::doctor("doc@example.com");
        assert_eq!(user.role, "doctor");

        let current = user.to_user();
        assert_eq!(current.email, Some(user.email.clone()));
        assert!(current.has_role("doctor"));
        assert_eq!(current.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let token = JwtTestUtils::create_test_token(&TestUser::default(), Some(1));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_availability_fixture_shape() {
        let body = MockBackendResponses::availability_response(&[("25-06-15", &["09:00-09:30"])]);
        assert_eq!(body["slots"][0]["date"], "25-06-15");
        assert_eq!(body["slots"][0]["time_slot"][0], "09:00-09:30");
    }
}
