use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use auth_cell::{PortalNavigator, SignInGuard};
use shared_config::AppConfig;
use shared_models::auth::Credential;
use shared_models::error::AppError;
use shared_utils::{IdentityProvider, SessionContext, StaticIdentity};

use crate::calendar::MonthAnchor;
use crate::models::{
    AppointmentListQuery, BookSlotRequest, CalendarQuery, SlotsQuery, CONFIRMATION_MESSAGE,
};
use crate::selector::{LoadState, SlotSelector};
use crate::services::listing::{filter_by_tab, group_by_date};
use crate::services::{AppointmentListService, BookingService};
use crate::session::BookingSession;

// ==============================================================================
// BOOKING PAGE
// ==============================================================================

/// Opens a booking page for `doctor_id` and waits for its availability.
async fn open_page(
    config: &AppConfig,
    session: SessionContext,
    navigator: PortalNavigator,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    doctor_id: String,
) -> Result<BookingSession, AppError> {
    let identity: Arc<dyn IdentityProvider> = match bearer {
        Some(TypedHeader(auth)) => Arc::new(StaticIdentity::new(Credential::new(auth.token()))),
        None => Arc::new(session),
    };

    let page = BookingSession::new(
        SlotSelector::from_config(doctor_id, config),
        Arc::new(BookingService::new(config)),
        identity,
        SignInGuard::from_config(config, Arc::new(navigator)),
    );
    page.mount();

    if page.ready().await.is_none() {
        return Err(AppError::Unauthenticated);
    }
    Ok(page)
}

#[axum::debug_handler]
pub async fn get_calendar(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Extension(navigator): Extension<PortalNavigator>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let page = open_page(&config, session, navigator, bearer, doctor_id).await?;
    let view = page.view().await;

    let calendar = match query.month.as_deref() {
        Some(month) => {
            let anchor = MonthAnchor::parse(month)
                .ok_or_else(|| AppError::BadRequest(format!("month must be YYYY-MM, got {:?}", month)))?;
            page.render_month(anchor).await
        }
        None => view.calendar,
    };
    debug!("Rendered {} for doctor {}", calendar.label, view.doctor_id);

    Ok(Json(json!({
        "doctor_id": view.doctor_id,
        "window": view.window,
        "load_state": view.load_state,
        "error": view.error,
        "calendar": calendar
    })))
}

#[axum::debug_handler]
pub async fn get_slots(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Extension(navigator): Extension<PortalNavigator>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Path(doctor_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let page = open_page(&config, session, navigator, bearer, doctor_id).await?;
    let selectable = page.click_date(query.date).await;
    let view = page.view().await;
    let slots = if selectable { view.slots } else { Vec::new() };

    Ok(Json(json!({
        "date": query.date,
        "selectable": selectable,
        "slots": slots,
        "error": view.error
    })))
}

#[axum::debug_handler]
pub async fn book_slot(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<SessionContext>,
    Extension(navigator): Extension<PortalNavigator>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<BookSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let page = open_page(&config, session, navigator, bearer, doctor_id).await?;

    if let LoadState::Failed(message) = page.view().await.load_state {
        return Err(AppError::ExternalService(message));
    }

    let confirmed = page
        .book(request.date, &request.time_slot, &request.reason_for_visit)
        .await?;

    Ok(Json(json!({
        "message": CONFIRMATION_MESSAGE,
        "appointment": confirmed,
        "dismiss_after_secs": config.confirmation_dismiss_secs
    })))
}

// ==============================================================================
// APPOINTMENT LISTS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(credential): Extension<Credential>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentListService::new(&config)
        .patient_appointments(&credential)
        .await
        .map_err(|e| e.into_app_error("Failed to fetch appointments"))?;

    let appointments = filter_by_tab(appointments, query.tab);
    let total = appointments.len();

    Ok(Json(json!({
        "tab": query.tab,
        "total": total,
        "groups": group_by_date(appointments)
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(credential): Extension<Credential>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentListService::new(&config)
        .doctor_appointments(&credential)
        .await
        .map_err(|e| e.into_app_error("Failed to fetch appointments"))?;

    let appointments = filter_by_tab(appointments, query.tab);
    let total = appointments.len();

    Ok(Json(json!({
        "tab": query.tab,
        "total": total,
        "groups": group_by_date(appointments)
    })))
}
