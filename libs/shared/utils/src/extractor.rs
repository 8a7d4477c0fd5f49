use axum::{
    body::Body,
    extract::Extension,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use tracing::debug;

use shared_models::auth::Credential;
use shared_models::error::AppError;

use crate::jwt::{current_user_from_token, TokenError};
use crate::session::SessionContext;

/// Resolves the credential for a protected route.
///
/// An explicit `Authorization: Bearer` header wins; otherwise the process-wide
/// session credential is used. The resolved `Credential` (and the decoded
/// `CurrentUser`, when the token carries readable claims) are added to the
/// request extensions.
pub async fn credential_middleware(
    Extension(session): Extension<SessionContext>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let credential = match bearer {
        Some(TypedHeader(auth)) => Credential::new(auth.token()),
        None => {
            if session.is_initializing() {
                debug!("Waiting for session initialization");
                session.wait_initialized().await;
            }
            session.credential().ok_or(AppError::Unauthenticated)?
        }
    };

    match current_user_from_token(credential.token()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
        }
        Err(TokenError::Expired) => {
            return Err(AppError::Unauthenticated);
        }
        Err(e) => debug!("Credential has no readable claims: {}", e),
    }

    request.extensions_mut().insert(credential);

    Ok(next.run(request).await)
}

