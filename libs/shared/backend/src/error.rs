use shared_models::error::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Authentication error ({status}): {detail}")]
    Unauthorized { status: u16, detail: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Unauthorized { status, .. } | BackendError::Api { status, .. } => {
                Some(*status)
            }
            BackendError::NotFound(_) => Some(404),
            BackendError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The message the backend put in the error body, if any.
    pub fn detail(&self) -> Option<&str> {
        let detail = match self {
            BackendError::Unauthorized { detail, .. } | BackendError::Api { detail, .. } => detail,
            BackendError::NotFound(detail) => detail,
            _ => return None,
        };
        if detail.trim().is_empty() {
            None
        } else {
            Some(detail.as_str())
        }
    }

    /// Server-provided message, or `fallback` when the backend gave none.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn into_app_error(self, fallback: &str) -> AppError {
        let message = self.user_message(fallback);
        match self {
            BackendError::Unauthorized { .. } | BackendError::InvalidCredential(_) => {
                AppError::Auth(message)
            }
            BackendError::NotFound(_) => AppError::NotFound(message),
            BackendError::Api { status, .. } => AppError::Upstream {
                status,
                detail: message,
            },
            BackendError::Transport(_) | BackendError::Decode(_) => {
                AppError::ExternalService(message)
            }
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        err.into_app_error("Request to the clinic backend failed")
    }
}
