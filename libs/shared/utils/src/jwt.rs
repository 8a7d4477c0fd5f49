use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use thiserror::Error;
use tracing::debug;

use shared_models::auth::{CurrentUser, JwtClaims};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token format")]
    Malformed,

    #[error("Invalid claims encoding")]
    Encoding,

    #[error("Invalid claims format: {0}")]
    Claims(String),

    #[error("Token expired")]
    Expired,
}

/// Decodes the payload of a backend-issued JWT.
///
/// The signature is not checked here; the backend enforces it on every call.
/// The portal only needs the identity claims for display and routing.
pub fn decode_claims(token: &str) -> Result<JwtClaims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(TokenError::Malformed);
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or(TokenError::Encoding)?;

    serde_json::from_str(&claims_json).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        TokenError::Claims(e.to_string())
    })
}

pub fn is_expired(claims: &JwtClaims) -> bool {
    match claims.exp {
        Some(exp) => exp < Utc::now().timestamp() as u64,
        None => false,
    }
}

/// Resolves the signed-in user from a token, rejecting expired tokens.
pub fn current_user_from_token(token: &str) -> Result<CurrentUser, TokenError> {
    let claims = decode_claims(token)?;

    if is_expired(&claims) {
        debug!("Token for {} expired at {:?}", claims.sub, claims.exp);
        return Err(TokenError::Expired);
    }

    let id = match &claims.user_id {
        Some(serde_json::Value::String(id)) => id.clone(),
        Some(serde_json::Value::Number(id)) => id.to_string(),
        _ => claims.sub.clone(),
    };

    let expires_at = claims
        .exp
        .and_then(|exp| Utc.timestamp_opt(exp as i64, 0).single());

    Ok(CurrentUser {
        id,
        username: claims.sub,
        email: claims.email,
        role: claims.role,
        name: claims.name,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{JwtTestUtils, TestUser};

    #[test]
    fn test_current_user_from_valid_token() {
        let user = TestUser::doctor("doc@clinic.test");
        let token = JwtTestUtils::create_test_token(&user, Some(1));

        let current = current_user_from_token(&token).unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(current.username, "doc@clinic.test");
        assert!(current.has_role("doctor"));
        assert!(current.expires_at.is_some());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = JwtTestUtils::create_expired_token(&TestUser::default());
        assert_eq!(current_user_from_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        assert_eq!(decode_claims("not-a-jwt").unwrap_err(), TokenError::Malformed);
        assert_eq!(
            decode_claims(&JwtTestUtils::create_malformed_token()).unwrap_err(),
            TokenError::Encoding
        );
    }
}
