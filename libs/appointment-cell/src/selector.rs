use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use shared_backend::BackendError;
use shared_config::AppConfig;
use shared_models::auth::Credential;
use shared_models::error::AppError;

use crate::availability::AvailabilityIndex;
use crate::calendar::{can_go_back, render_calendar_grid, BookingWindow, CalendarGrid, MonthAnchor};
use crate::models::{
    AppointmentRequest, AvailabilityRecord, Confirmation, ConfirmedSlot, SelectionState,
    TimeSlotLabel, CONFIRMATION_MESSAGE,
};
use crate::services::booking::{AppointmentWriter, AvailabilityProvider};

pub const LOAD_FAILED: &str = "Failed to fetch available slots";
pub const SUBMIT_FAILED: &str = "Failed to create appointment";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("An appointment is already being submitted")]
    SubmissionPending,

    #[error("Available slots are still loading")]
    Loading,

    #[error("Available slots have not been loaded")]
    NotLoaded,

    #[error("{0} is outside the booking window")]
    OutsideWindow(NaiveDate),

    #[error("{slot} is not available on {date}")]
    SlotUnavailable { date: NaiveDate, slot: String },

    #[error("Time slot {0:?} is not in HH:MM-HH:MM form")]
    MalformedSlot(String),

    #[error("No time slot has been selected")]
    NothingSelected,
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::SubmissionPending => AppError::Conflict(err.to_string()),
            other => AppError::ValidationError(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: BackendError,
    },

    #[error("Please sign in to book an appointment")]
    SignedOut,

    #[error("The booking page was closed")]
    Cancelled,
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        let message = err.to_string();
        match err {
            SubmitError::Selection(e) => e.into(),
            SubmitError::Rejected { source, .. } => source.into_app_error(SUBMIT_FAILED),
            SubmitError::SignedOut => AppError::Unauthenticated,
            SubmitError::Cancelled => AppError::Unavailable(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
    SignInRequired,
}

/// Everything the booking page renders.
#[derive(Debug, Clone, Serialize)]
pub struct SelectorView {
    pub doctor_id: String,
    pub load_state: LoadState,
    pub loading: bool,
    pub window: BookingWindow,
    pub calendar: CalendarGrid,
    pub focused_date: Option<NaiveDate>,
    pub slots: Vec<TimeSlotLabel>,
    pub selection: SelectionState,
    pub submitting: bool,
    pub error: Option<String>,
    pub confirmation: Option<String>,
    pub confirmed: Option<ConfirmedSlot>,
}

/// Calendar, slot list and selection state for booking with one doctor.
pub struct SlotSelector {
    doctor_id: String,
    window: BookingWindow,
    month: MonthAnchor,
    load_state: LoadState,
    availability: Option<AvailabilityIndex>,
    focused_date: Option<NaiveDate>,
    selection: SelectionState,
    pending: Option<AppointmentRequest>,
    submitting: bool,
    error: Option<String>,
    confirmation: Option<Confirmation>,
    confirmed: Option<ConfirmedSlot>,
    confirmation_ttl: Duration,
}

impl SlotSelector {
    pub fn new(doctor_id: impl Into<String>, window: BookingWindow) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            month: MonthAnchor::containing(window.today),
            window,
            load_state: LoadState::Idle,
            availability: None,
            focused_date: None,
            selection: SelectionState::default(),
            pending: None,
            submitting: false,
            error: None,
            confirmation: None,
            confirmed: None,
            confirmation_ttl: Duration::from_secs(shared_config::DEFAULT_CONFIRMATION_DISMISS_SECS),
        }
    }

    pub fn from_config(doctor_id: impl Into<String>, config: &AppConfig) -> Self {
        Self::new(doctor_id, BookingWindow::starting_today(config.booking_window_days))
            .with_confirmation_ttl(config.confirmation_dismiss())
    }

    pub fn with_confirmation_ttl(mut self, ttl: Duration) -> Self {
        self.confirmation_ttl = ttl;
        self
    }

    pub fn doctor_id(&self) -> &str {
        &self.doctor_id
    }

    pub fn window(&self) -> &BookingWindow {
        &self.window
    }

    pub fn month(&self) -> MonthAnchor {
        self.month
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn availability(&self) -> Option<&AvailabilityIndex> {
        self.availability.as_ref()
    }

    pub fn focused_date(&self) -> Option<NaiveDate> {
        self.focused_date
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn pending_request(&self) -> Option<&AppointmentRequest> {
        self.pending.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn confirmed(&self) -> Option<&ConfirmedSlot> {
        self.confirmed.as_ref()
    }

    // --------------------------------------------------------------------------
    // Loading
    // --------------------------------------------------------------------------

    pub fn begin_load(&mut self) {
        self.load_state = LoadState::Loading;
        self.availability = None;
        self.error = None;
    }

    pub fn finish_load(&mut self, result: Result<Vec<AvailabilityRecord>, BackendError>) {
        match result {
            Ok(records) => {
                let index = AvailabilityIndex::from_records(records);
                debug!("Loaded availability for {} dates", index.len());
                self.availability = Some(index);
                self.load_state = LoadState::Ready;
            }
            Err(e) => {
                let message = e.user_message(LOAD_FAILED);
                warn!("Could not load availability for doctor {}: {}", self.doctor_id, e);
                self.availability = None;
                self.load_state = LoadState::Failed(message.clone());
                self.error = Some(message);
            }
        }
    }

    pub fn require_sign_in(&mut self) {
        self.load_state = LoadState::SignInRequired;
    }

    #[instrument(skip(self, provider, credential), fields(doctor_id = %self.doctor_id))]
    pub async fn load_availability(&mut self, provider: &dyn AvailabilityProvider, credential: &Credential) {
        self.begin_load();
        let result = provider.load_availability(&self.doctor_id, credential).await;
        self.finish_load(result);
    }

    // --------------------------------------------------------------------------
    // Calendar
    // --------------------------------------------------------------------------

    pub fn calendar(&self) -> CalendarGrid {
        self.render_month(self.month)
    }

    pub fn render_month(&self, anchor: MonthAnchor) -> CalendarGrid {
        render_calendar_grid(anchor, &self.window, self.availability.as_ref())
    }

    pub fn next_month(&mut self) {
        self.month = self.month.next();
    }

    /// Refused, returning `false`, on the current month.
    pub fn previous_month(&mut self) -> bool {
        if !can_go_back(self.month, &self.window) {
            return false;
        }
        self.month = self.month.previous();
        true
    }

    pub fn is_selectable(&self, date: NaiveDate) -> bool {
        self.window.contains(date)
            && self
                .availability
                .as_ref()
                .is_some_and(|index| index.has_record(date))
    }

    /// Focuses `date` when it can be booked; otherwise does nothing.
    pub fn click_date(&mut self, date: NaiveDate) -> bool {
        if !self.is_selectable(date) {
            debug!("Ignoring click on {}", date);
            return false;
        }

        if self.focused_date != Some(date) {
            self.selection.clear_slot();
            self.pending = None;
        }
        self.focused_date = Some(date);
        true
    }

    pub fn list_slots_for_date(&self, date: NaiveDate) -> &[TimeSlotLabel] {
        self.availability
            .as_ref()
            .map(|index| index.slots_for(date))
            .unwrap_or(&[])
    }

    // --------------------------------------------------------------------------
    // Selection and submission
    // --------------------------------------------------------------------------

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.selection.reason_for_visit = reason.into();
    }

    /// Validates the choice and stores it as the pending request.
    pub fn select_slot(
        &mut self,
        date: NaiveDate,
        label: &str,
        reason_for_visit: &str,
    ) -> Result<AppointmentRequest, SelectionError> {
        if self.submitting {
            return Err(SelectionError::SubmissionPending);
        }
        if self.is_loading() {
            return Err(SelectionError::Loading);
        }
        let Some(index) = self.availability.as_ref() else {
            return Err(SelectionError::NotLoaded);
        };
        if !self.window.contains(date) {
            return Err(SelectionError::OutsideWindow(date));
        }
        if !index.contains_slot(date, label) {
            return Err(SelectionError::SlotUnavailable {
                date,
                slot: label.to_string(),
            });
        }

        let slot = TimeSlotLabel::new(label);
        let (start_time, end_time) = slot
            .split()
            .ok_or_else(|| SelectionError::MalformedSlot(label.to_string()))?;

        let request = AppointmentRequest {
            date,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            reason_for_visit: reason_for_visit.to_string(),
        };

        self.focused_date = Some(date);
        self.selection = SelectionState {
            selected_date: Some(date),
            selected_slot: Some(slot.clone()),
            reason_for_visit: reason_for_visit.to_string(),
        };
        self.pending = Some(request.clone());
        self.error = None;

        Ok(request)
    }

    /// Marks the pending request as in flight and hands it out.
    pub fn begin_submit(&mut self) -> Result<AppointmentRequest, SelectionError> {
        if self.submitting {
            return Err(SelectionError::SubmissionPending);
        }
        let request = self.pending.clone().ok_or(SelectionError::NothingSelected)?;
        self.submitting = true;
        self.error = None;
        Ok(request)
    }

    pub fn finish_submit(
        &mut self,
        request: &AppointmentRequest,
        result: Result<Value, BackendError>,
        now: Instant,
    ) -> Result<ConfirmedSlot, SubmitError> {
        self.submitting = false;

        match result {
            Ok(_) => {
                let confirmed = ConfirmedSlot::from_request(request);
                info!(
                    "Booked {} {}-{} with doctor {}",
                    request.date, request.start_time, request.end_time, self.doctor_id
                );
                self.confirmation = Some(Confirmation {
                    message: CONFIRMATION_MESSAGE.to_string(),
                    expires_at: now + self.confirmation_ttl,
                });
                self.confirmed = Some(confirmed.clone());
                self.selection = SelectionState::default();
                self.pending = None;
                Ok(confirmed)
            }
            Err(e) => {
                let message = e.user_message(SUBMIT_FAILED);
                warn!("Booking with doctor {} failed: {}", self.doctor_id, e);
                self.error = Some(message.clone());
                Err(SubmitError::Rejected { message, source: e })
            }
        }
    }

    #[instrument(skip(self, writer, credential), fields(doctor_id = %self.doctor_id))]
    pub async fn submit_appointment(
        &mut self,
        writer: &dyn AppointmentWriter,
        credential: &Credential,
    ) -> Result<ConfirmedSlot, SubmitError> {
        let request = self.begin_submit()?;
        let result = writer.create_appointment(&self.doctor_id, &request, credential).await;
        self.finish_submit(&request, result, Instant::now())
    }

    pub fn confirmation(&self, now: Instant) -> Option<&Confirmation> {
        self.confirmation.as_ref().filter(|c| c.is_visible(now))
    }

    pub fn confirmation_ttl(&self) -> Duration {
        self.confirmation_ttl
    }

    /// Drops the notice once its time is up; the confirmed summary stays.
    pub fn dismiss_expired_confirmation(&mut self, now: Instant) {
        if self.confirmation.as_ref().is_some_and(|c| !c.is_visible(now)) {
            self.confirmation = None;
        }
    }

    pub fn view(&self, now: Instant) -> SelectorView {
        let slots = self
            .focused_date
            .map(|date| self.list_slots_for_date(date).to_vec())
            .unwrap_or_default();

        SelectorView {
            doctor_id: self.doctor_id.clone(),
            load_state: self.load_state.clone(),
            loading: self.is_loading(),
            window: self.window,
            calendar: self.calendar(),
            focused_date: self.focused_date,
            slots,
            selection: self.selection.clone(),
            submitting: self.submitting,
            error: self.error.clone(),
            confirmation: self.confirmation(now).map(|c| c.message.clone()),
            confirmed: self.confirmed.clone(),
        }
    }
}
