use serde::{Deserialize, Serialize};

use shared_models::auth::CurrentUser;
use shared_models::validation::text_or_number;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Sign-up form as the browser submits it; every field arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub mobile_no: String,
    #[serde(default)]
    pub gmail: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_role")]
    pub user_role: String,
}

fn default_role() -> String {
    UserRole::Patient.as_str().to_string()
}

/// Body sent to the backend's registration endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: String,
    pub mobile_no: String,
    pub gmail: String,
    pub password: String,
    pub user_role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Patient,
    Doctor,
    Admin,
}

impl UserRole {
    pub fn parse(role: &str) -> Option<Self> {
        match role.trim().to_ascii_lowercase().as_str() {
            "patient" => Some(UserRole::Patient),
            "doctor" => Some(UserRole::Doctor),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Patient => "patient",
            UserRole::Doctor => "doctor",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    #[serde(default)]
    pub user_role: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gmail: Option<String>,
}

impl RegisteredUser {
    /// Page that completes the sign-up for this user's role.
    pub fn next_route(&self) -> String {
        match UserRole::parse(&self.user_role) {
            Some(UserRole::Doctor) => format!("/create-doctor-profile/{}", self.id),
            _ => format!("/patient-profile/{}", self.id),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RegistrationResponse {
    Wrapped { user: RegisteredUser },
    Bare(RegisteredUser),
}

impl RegistrationResponse {
    pub fn into_user(self) -> RegisteredUser {
        match self {
            RegistrationResponse::Wrapped { user } | RegistrationResponse::Bare(user) => user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub initializing: bool,
    pub logged_in: bool,
    pub user: Option<CurrentUser>,
    pub redirect: Option<String>,
}
