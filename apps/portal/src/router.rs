use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};

use appointment_cell::{appointment_list_routes, booking_routes};
use auth_cell::{auth_routes, PortalNavigator};
use doctor_cell::{admin_routes, doctor_routes};
use patient_cell::patient_routes;
use shared_config::AppConfig;
use shared_utils::SessionContext;

pub fn create_router(state: Arc<AppConfig>, session: SessionContext, navigator: PortalNavigator) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic portal is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/booking", booking_routes(state.clone()))
        .nest("/appointments", appointment_list_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        .nest("/patients", patient_routes(state))
        .layer(Extension(session))
        .layer(Extension(navigator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir) -> (Router, SessionContext) {
        let config = AppConfig {
            token_file: dir.path().join("access_token"),
            ..AppConfig::default()
        };
        let session = SessionContext::from_config(&config);
        (create_router(Arc::new(config), session.clone(), PortalNavigator::new()), session)
    }

    #[tokio::test]
    async fn test_root_responds() {
        let dir = TempDir::new().unwrap();
        let (app, _) = app(&dir);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_session_status_is_mounted_under_auth() {
        let dir = TempDir::new().unwrap();
        let (app, session) = app(&dir);
        session.init().await.unwrap();

        let response = app
            .oneshot(Request::builder().uri("/auth/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let status: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(status["logged_in"], false);
        assert_eq!(status["initializing"], false);
    }

    #[tokio::test]
    async fn test_protected_routes_need_credential() {
        let dir = TempDir::new().unwrap();
        let (app, session) = app(&dir);
        session.init().await.unwrap();

        for uri in ["/appointments/patient", "/doctors", "/admin/verifications", "/patients/profile"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }
}
