use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Route the front-end sends signed-out users to.
pub const SIGN_IN_ROUTE: &str = "/login-page";

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub user_id: Option<serde_json::Value>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CurrentUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.role
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case(role))
            .unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }
}

/// Bearer credential issued by the backend. The token itself never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Body returned by the backend's token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expiry_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("secret-token");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.token(), "secret-token");
    }

    #[test]
    fn test_role_checks_ignore_case() {
        let user = CurrentUser {
            id: "7".to_string(),
            username: "admin@clinic.test".to_string(),
            email: None,
            role: Some("ADMIN".to_string()),
            name: None,
            expires_at: None,
        };

        assert!(user.is_admin());
        assert!(!user.has_role("doctor"));
    }
}
