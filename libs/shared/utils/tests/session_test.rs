use std::time::Duration;

use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Router,
};
use tempfile::TempDir;
use tower::ServiceExt;

use shared_models::auth::Credential;
use shared_utils::extractor::credential_middleware;
use shared_utils::test_utils::{JwtTestUtils, TestUser};
use shared_utils::{IdentityProvider, SessionContext};

fn session_in(dir: &TempDir) -> SessionContext {
    SessionContext::new(dir.path().join("nested").join("access_token"))
}

#[tokio::test]
async fn test_init_without_token_file_is_signed_out() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);

    assert!(session.is_initializing());
    session.init().await.unwrap();

    assert!(!session.is_initializing());
    assert!(session.credential().is_none());
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_login_persists_and_restores() {
    let dir = TempDir::new().unwrap();
    let user = TestUser::patient("jane@clinic.test");
    let token = JwtTestUtils::create_test_token(&user, Some(2));

    let session = session_in(&dir);
    session.init().await.unwrap();
    let logged_in = session.login(&token).await.unwrap().unwrap();
    assert_eq!(logged_in.id, user.id);

    // A fresh process picks the token back up from disk.
    let restored = session_in(&dir);
    restored.init().await.unwrap();
    assert_eq!(restored.credential(), Some(Credential::new(token.clone())));
    assert_eq!(restored.current_user().map(|u| u.id), Some(user.id));
}

#[tokio::test]
async fn test_expired_persisted_token_is_discarded() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);
    std::fs::create_dir_all(session.token_file().parent().unwrap()).unwrap();
    std::fs::write(
        session.token_file(),
        JwtTestUtils::create_expired_token(&TestUser::default()),
    )
    .unwrap();

    session.init().await.unwrap();

    assert!(session.credential().is_none());
    assert!(!session.token_file().exists());
}

#[tokio::test]
async fn test_logout_clears_credential_and_file() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);
    session.init().await.unwrap();
    session
        .login(&JwtTestUtils::create_test_token(&TestUser::default(), None))
        .await
        .unwrap();
    assert!(session.token_file().exists());

    session.logout().await.unwrap();

    assert!(!session.is_logged_in());
    assert!(!session.token_file().exists());
}

#[tokio::test]
async fn test_token_expiring_mid_session_signs_out() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);
    session.init().await.unwrap();
    let token = JwtTestUtils::create_token_expiring_in(
        &TestUser::patient("jane@clinic.test"),
        chrono::Duration::seconds(1),
    );
    session.login(&token).await.unwrap();
    assert!(session.is_logged_in());

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert!(IdentityProvider::credential(&session).is_none());
    assert!(session.credential().is_none());
    assert!(!session.is_logged_in());
    assert!(session.current_user().is_none());

    let response = protected_app(session.clone())
        .oneshot(Request::builder().uri("/protected").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The stale file is rejected on the next start.
    let restored = session_in(&dir);
    restored.init().await.unwrap();
    assert!(restored.credential().is_none());
    assert!(!restored.token_file().exists());
}

#[tokio::test]
async fn test_wait_initialized_resolves_after_init() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);

    let waiter = {
        let session = session.clone();
        tokio::spawn(async move {
            IdentityProvider::wait_initialized(&session).await;
            session.is_initializing()
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    session.init().await.unwrap();

    let still_initializing = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .unwrap()
        .unwrap();
    assert!(!still_initializing);
}

fn protected_app(session: SessionContext) -> Router {
    Router::new()
        .route(
            "/protected",
            get(|Extension(credential): Extension<Credential>| async move {
                credential.token().to_string()
            }),
        )
        .layer(middleware::from_fn(credential_middleware))
        .layer(Extension(session))
}

#[tokio::test]
async fn test_middleware_rejects_signed_out_session() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);
    session.init().await.unwrap();

    let response = protected_app(session)
        .oneshot(Request::builder().uri("/protected").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["redirect"], "/login-page");
}

#[tokio::test]
async fn test_middleware_prefers_bearer_header_over_session() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);
    session.init().await.unwrap();
    let session_token = JwtTestUtils::create_test_token(&TestUser::default(), None);
    session.login(&session_token).await.unwrap();

    let header_token = JwtTestUtils::create_test_token(&TestUser::admin("root@clinic.test"), None);
    let response = protected_app(session.clone())
        .oneshot(
            Request::builder()
                .uri("/protected")
                .header("authorization", format!("Bearer {}", header_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, header_token.as_bytes());

    let response = protected_app(session)
        .oneshot(Request::builder().uri("/protected").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, session_token.as_bytes());
}

#[test]
fn test_session_context_is_cheap_to_share() {
    let dir = TempDir::new().unwrap();
    let session = session_in(&dir);
    let clone = session.clone();

    tokio_test::block_on(session.init()).unwrap();
    assert!(!clone.is_initializing());
}
