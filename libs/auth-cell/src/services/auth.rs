use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use shared_backend::{BackendClient, BackendError, Method};
use shared_config::AppConfig;
use shared_models::auth::{CurrentUser, TokenResponse};
use shared_models::error::AppError;
use shared_models::validation::ValidationErrors;
use shared_utils::SessionContext;

use crate::models::{LoginForm, RegisteredUser, RegistrationForm, RegistrationResponse};
use crate::services::validation::{validate_login, validate_registration};

const LOGIN_FAILED: &str = "Login Failed";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(#[from] ValidationErrors),

    #[error("Login failed: {0}")]
    LoginRejected(BackendError),

    #[error("Registration failed: {0}")]
    RegistrationRejected(BackendError),

    #[error("Could not store the session: {0}")]
    Session(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Invalid(errors) => AppError::InvalidFields(errors),
            AuthError::LoginRejected(BackendError::Unauthorized { detail, .. }) => {
                AppError::Auth(if detail.trim().is_empty() {
                    LOGIN_FAILED.to_string()
                } else {
                    detail
                })
            }
            AuthError::LoginRejected(e) => e.into_app_error(LOGIN_FAILED),
            AuthError::RegistrationRejected(e) => e.into_app_error(REGISTRATION_FAILED),
            AuthError::Session(e) => AppError::Internal(e.to_string()),
        }
    }
}

pub struct AuthService {
    backend: BackendClient,
}

impl AuthService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    /// Exchanges username and password for a token and installs it in the session.
    #[instrument(skip(self, form, session), fields(username = %form.username))]
    pub async fn sign_in(
        &self,
        form: &LoginForm,
        session: &SessionContext,
    ) -> Result<Option<CurrentUser>, AuthError> {
        validate_login(form)?;

        let token: TokenResponse = self
            .backend
            .post_form(
                "/auth/token",
                None,
                &[("username", form.username.trim()), ("password", &form.password)],
            )
            .await
            .map_err(AuthError::LoginRejected)?;

        debug!("Token issued, expires {:?}", token.expiry_time);
        let user = session.login(&token.access_token).await?;
        info!("Signed in as {}", form.username.trim());

        Ok(user)
    }

    pub async fn sign_out(&self, session: &SessionContext) -> Result<(), AuthError> {
        session.logout().await?;
        info!("Signed out");
        Ok(())
    }

    #[instrument(skip(self, form), fields(role = %form.user_role))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<RegisteredUser, AuthError> {
        let request = validate_registration(form)?;

        let response: RegistrationResponse = self
            .backend
            .request(Method::POST, "/users/user-register", None, Some(json!(request)))
            .await
            .map_err(|e| {
                warn!("Registration rejected: {}", e);
                AuthError::RegistrationRejected(e)
            })?;

        let user = response.into_user();
        info!("Registered user {} as {}", user.id, user.user_role);
        Ok(user)
    }
}
