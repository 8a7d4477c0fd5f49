use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::Extension,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::wire::to_wire_date;
use appointment_cell::{appointment_list_routes, booking_routes};
use auth_cell::PortalNavigator;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockBackendResponses, TestConfig, TestUser};
use shared_utils::SessionContext;

const TOKEN: &str = "patient-token";

struct Harness {
    booking: Router,
    lists: Router,
    session: SessionContext,
    navigator: PortalNavigator,
    _dir: TempDir,
}

async fn harness(backend: &MockServer) -> Harness {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        token_file: dir.path().join("access_token"),
        sign_in_redirect_delay_ms: 50,
        ..TestConfig::with_backend(&backend.uri()).to_app_config()
    };
    let config = Arc::new(config);

    let session = SessionContext::from_config(&config);
    session.init().await.unwrap();
    let navigator = PortalNavigator::new();

    let booking = booking_routes(config.clone())
        .layer(Extension(session.clone()))
        .layer(Extension(navigator.clone()));
    let lists = appointment_list_routes(config)
        .layer(Extension(session.clone()));

    Harness {
        booking,
        lists,
        session,
        navigator,
        _dir: dir,
    }
}

fn days_from_today(days: i64) -> NaiveDate {
    Local::now().date_naive() + ChronoDuration::days(days)
}

async fn mount_availability(backend: &MockServer, records: &[(NaiveDate, &[&str])]) {
    let wire: Vec<(String, &[&str])> = records.iter().map(|(d, s)| (to_wire_date(*d), *s)).collect();
    let borrowed: Vec<(&str, &[&str])> = wire.iter().map(|(d, s)| (d.as_str(), *s)).collect();

    Mock::given(method("GET"))
        .and(path("/appointment/select-appointment-slot/4"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(MockBackendResponses::availability_response(&borrowed)),
        )
        .mount(backend)
        .await;
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", TOKEN))
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", TOKEN))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_booking_sends_full_date_and_split_slot() {
    let backend = MockServer::start().await;
    let day = days_from_today(5);
    mount_availability(&backend, &[(day, &["09:00-09:30", "10:00-10:30"])]).await;

    Mock::given(method("POST"))
        .and(path("/appointment/create-appointment/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::appointment_created_response("4", &day.to_string(), "09:00", "09:30"),
        ))
        .expect(1)
        .mount(&backend)
        .await;

    let h = harness(&backend).await;
    let response = h
        .booking
        .oneshot(post_json(
            "/4",
            json!({ "date": day, "time_slot": "09:00-09:30", "reason_for_visit": "Checkup" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Appointment Created successfully!");
    assert_eq!(body["appointment"]["start_time"], "09:00");

    let requests = backend.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.url.path() == "/appointment/create-appointment/4")
        .unwrap();
    let sent: Value = serde_json::from_slice(&create.body).unwrap();
    assert_eq!(
        sent,
        json!({
            "date": day.format("%Y-%m-%d").to_string(),
            "start_time": "09:00",
            "end_time": "09:30",
            "reason_for_visit": "Checkup"
        })
    );
}

#[tokio::test]
async fn test_slot_not_offered_is_rejected_locally() {
    let backend = MockServer::start().await;
    let day = days_from_today(3);
    mount_availability(&backend, &[(day, &["09:00-09:30"])]).await;

    Mock::given(method("POST"))
        .and(path("/appointment/create-appointment/4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let h = harness(&backend).await;
    let response = h
        .booking
        .oneshot(post_json("/4", json!({ "date": day, "time_slot": "11:00-11:30" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_conflict_surfaces_backend_detail() {
    let backend = MockServer::start().await;
    let day = days_from_today(2);
    mount_availability(&backend, &[(day, &["09:00-09:30"])]).await;

    Mock::given(method("POST"))
        .and(path("/appointment/create-appointment/4"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(MockBackendResponses::error_response("slot already booked")),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let h = harness(&backend).await;
    let response = h
        .booking
        .oneshot(post_json("/4", json!({ "date": day, "time_slot": "09:00-09:30" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["detail"], "slot already booked");
    assert_eq!(h.navigator.navigation_count(), 0);
}

#[tokio::test]
async fn test_calendar_marks_bookable_days() {
    let backend = MockServer::start().await;
    let inside = days_from_today(1);
    let beyond = days_from_today(45);
    mount_availability(&backend, &[(inside, &["09:00-09:30"]), (beyond, &["09:00-09:30"])]).await;

    let h = harness(&backend).await;
    let month = inside.format("%Y-%m").to_string();
    let response = h
        .booking
        .oneshot(get(&format!("/4/calendar?month={}", month)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["window"]["max_date"], json!(days_from_today(30)));

    let cells: Vec<&Value> = body["calendar"]["weeks"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|week| week.as_array().unwrap().iter())
        .filter(|cell| !cell.is_null())
        .collect();
    let cell = cells.iter().find(|c| c["date"] == json!(inside)).unwrap();
    assert_eq!(cell["has_availability"], true);
    assert_eq!(cell["is_beyond_window"], false);
}

#[tokio::test]
async fn test_slots_for_day_beyond_window_are_hidden() {
    let backend = MockServer::start().await;
    let beyond = days_from_today(40);
    mount_availability(&backend, &[(beyond, &["09:00-09:30"])]).await;

    let h = harness(&backend).await;
    let response = h
        .booking
        .oneshot(get(&format!("/4/slots?date={}", beyond)))
        .await
        .unwrap();

    let body = read_json(response).await;
    assert_eq!(body["selectable"], false);
    assert_eq!(body["slots"], json!([]));
}

#[tokio::test]
async fn test_failed_availability_load_shows_fallback_message() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointment/select-appointment-slot/4"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&backend)
        .await;

    let h = harness(&backend).await;
    let response = h.booking.clone().oneshot(get("/4/calendar")).await.unwrap();
    let body = read_json(response).await;
    assert_eq!(body["error"], "Failed to fetch available slots");

    let response = h
        .booking
        .oneshot(post_json("/4", json!({ "date": days_from_today(1), "time_slot": "09:00-09:30" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_signed_out_visit_redirects_to_sign_in_once() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointment/select-appointment-slot/4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let h = harness(&backend).await;
    let response = h
        .booking
        .oneshot(Request::builder().uri("/4/calendar").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["redirect"], "/login-page");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.navigator.navigation_count(), 1);
    assert_eq!(h.navigator.pending_route().as_deref(), Some("/login-page"));
}

#[tokio::test]
async fn test_session_credential_is_used_without_header() {
    let backend = MockServer::start().await;
    let token = JwtTestUtils::create_test_token(&TestUser::patient("jane@clinic.test"), Some(2));
    let day = days_from_today(4);

    Mock::given(method("GET"))
        .and(path("/appointment/select-appointment-slot/4"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "date": to_wire_date(day), "time_slot": ["13:00-13:30"] }
        ])))
        .expect(1)
        .mount(&backend)
        .await;

    let h = harness(&backend).await;
    h.session.login(&token).await.unwrap();

    let response = h
        .booking
        .oneshot(
            Request::builder()
                .uri(format!("/4/slots?date={}", day))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = read_json(response).await;
    assert_eq!(body["selectable"], true);
    assert_eq!(body["slots"], json!(["13:00-13:30"]));
}

#[tokio::test]
async fn test_patient_appointments_filtered_and_grouped() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointment/all-patient-appointment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::appointment_response(1, "2025-06-15", "14:00", "scheduled"),
            MockBackendResponses::appointment_response(2, "2025-06-15", "09:00", "SCHEDULED"),
            MockBackendResponses::appointment_response(3, "2025-06-20", "09:00", "completed"),
        ])))
        .mount(&backend)
        .await;

    let h = harness(&backend).await;
    let response = h
        .lists
        .oneshot(get("/patient?tab=upcoming"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total"], 2);
    let group = &body["groups"][0];
    assert_eq!(group["date"], "2025-06-15");
    assert_eq!(group["appointments"][0]["id"], 2);
    assert_eq!(group["appointments"][0]["start_display"], "9:00 AM");
}

#[tokio::test]
async fn test_appointment_lists_require_credential() {
    let backend = MockServer::start().await;
    let h = harness(&backend).await;

    let response = h
        .lists
        .oneshot(Request::builder().uri("/doctor").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
