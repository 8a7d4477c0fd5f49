use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::wire::serde_wire_date;

// ==============================================================================
// AVAILABILITY
// ==============================================================================

/// A bookable interval as the backend labels it, e.g. `"09:00-09:30"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSlotLabel(String);

impl TimeSlotLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Start and end time, split on the first `-`.
    pub fn split(&self) -> Option<(&str, &str)> {
        let (start, end) = self.0.split_once('-')?;
        let (start, end) = (start.trim(), end.trim());
        if start.is_empty() || end.is_empty() {
            return None;
        }
        Some((start, end))
    }
}

impl fmt::Display for TimeSlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    #[serde(with = "serde_wire_date")]
    pub date: NaiveDate,
    #[serde(rename = "time_slot", default, deserialize_with = "null_as_empty")]
    pub time_slots: Vec<TimeSlotLabel>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<TimeSlotLabel>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<TimeSlotLabel>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The availability endpoint answers either with `{ "slots": [...] }` or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AvailabilityPayload {
    Wrapped { slots: Vec<AvailabilityRecord> },
    Bare(Vec<AvailabilityRecord>),
}

impl AvailabilityPayload {
    pub fn into_records(self) -> Vec<AvailabilityRecord> {
        match self {
            AvailabilityPayload::Wrapped { slots } | AvailabilityPayload::Bare(slots) => slots,
        }
    }
}

// ==============================================================================
// BOOKING
// ==============================================================================

/// Body of the create-appointment call. `date` goes out as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub reason_for_visit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub selected_date: Option<NaiveDate>,
    pub selected_slot: Option<TimeSlotLabel>,
    pub reason_for_visit: String,
}

impl SelectionState {
    pub fn clear_slot(&mut self) {
        self.selected_date = None;
        self.selected_slot = None;
    }
}

/// What was booked, kept for display after the selection is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmedSlot {
    pub date: NaiveDate,
    pub display_date: String,
    pub start_time: String,
    pub end_time: String,
    pub reason_for_visit: String,
}

impl ConfirmedSlot {
    pub fn from_request(request: &AppointmentRequest) -> Self {
        let reason = request.reason_for_visit.trim();
        Self {
            date: request.date,
            display_date: request.date.format("%A, %B %-d, %Y").to_string(),
            start_time: request.start_time.clone(),
            end_time: request.end_time.clone(),
            reason_for_visit: if reason.is_empty() {
                "Not specified".to_string()
            } else {
                reason.to_string()
            },
        }
    }
}

pub const CONFIRMATION_MESSAGE: &str = "Appointment Created successfully!";

/// Transient success notice.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub message: String,
    pub expires_at: Instant,
}

impl Confirmation {
    pub fn is_visible(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookSlotRequest {
    pub date: NaiveDate,
    pub time_slot: String,
    #[serde(default)]
    pub reason_for_visit: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    /// `YYYY-MM`; defaults to the current month.
    pub month: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

// ==============================================================================
// APPOINTMENT LISTS
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentParty {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub speciality: Option<String>,
    #[serde(default)]
    pub user: Option<PersonName>,
}

impl AppointmentParty {
    pub fn display_name(&self) -> Option<String> {
        let user = self.user.as_ref()?;
        let parts: Vec<&str> = [user.first_name.as_deref(), user.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub date: NaiveDate,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    pub appointment_status: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub reason_for_visit: Option<String>,
    #[serde(default)]
    pub fees: Option<f64>,
    #[serde(default)]
    pub doctor: Option<AppointmentParty>,
    #[serde(default)]
    pub patient: Option<AppointmentParty>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentTab {
    #[default]
    All,
    Upcoming,
    Completed,
    Cancelled,
    #[serde(alias = "in_progress")]
    InProgress,
}

impl AppointmentTab {
    /// Backend status the tab shows; `None` for all.
    pub fn status(&self) -> Option<&'static str> {
        match self {
            AppointmentTab::All => None,
            AppointmentTab::Upcoming => Some("scheduled"),
            AppointmentTab::Completed => Some("completed"),
            AppointmentTab::Cancelled => Some("cancelled"),
            AppointmentTab::InProgress => Some("inprogress"),
        }
    }

    pub fn matches(&self, status: &str) -> bool {
        self.status()
            .map(|wanted| status.trim().eq_ignore_ascii_case(wanted))
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentListQuery {
    #[serde(default)]
    pub tab: AppointmentTab,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentEntry {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub start_display: String,
    pub end_display: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentGroup {
    pub date: NaiveDate,
    pub display_date: String,
    pub appointments: Vec<AppointmentEntry>,
}
