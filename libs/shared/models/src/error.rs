use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::SIGN_IN_ROUTE;
use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid form: {0}")]
    InvalidFields(ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Backend error ({status}): {detail}")]
    Upstream { status: u16, detail: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) | AppError::InvalidFields(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    /// Message shown to the user, without the variant prefix.
    pub fn detail(&self) -> String {
        match self {
            AppError::Auth(msg)
            | AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Internal(msg)
            | AppError::ValidationError(msg)
            | AppError::Conflict(msg)
            | AppError::Unavailable(msg)
            | AppError::ExternalService(msg) => msg.clone(),
            AppError::InvalidFields(errors) => errors.to_string(),
            AppError::Unauthenticated => "Please sign in to continue".to_string(),
            AppError::Upstream { detail, .. } => detail.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.detail();

        tracing::error!("Error: {}: {}", status, message);

        let body = match &self {
            AppError::Unauthenticated => json!({
                "error": message,
                "detail": message,
                "redirect": SIGN_IN_ROUTE
            }),
            AppError::InvalidFields(errors) => json!({
                "error": message,
                "detail": message,
                "fields": errors
            }),
            _ => json!({
                "error": message,
                "detail": message
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::InvalidFields(errors)
    }
}
