use chrono::NaiveTime;
use tracing::{debug, instrument};

use shared_backend::{BackendClient, BackendError, Method};
use shared_config::AppConfig;
use shared_models::auth::Credential;

use crate::models::{Appointment, AppointmentEntry, AppointmentGroup, AppointmentTab};

pub struct AppointmentListService {
    backend: BackendClient,
}

impl AppointmentListService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            backend: BackendClient::new(config),
        }
    }

    #[instrument(skip(self, credential))]
    pub async fn patient_appointments(&self, credential: &Credential) -> Result<Vec<Appointment>, BackendError> {
        self.backend
            .request(Method::GET, "/appointment/all-patient-appointment", Some(credential), None)
            .await
    }

    #[instrument(skip(self, credential))]
    pub async fn doctor_appointments(&self, credential: &Credential) -> Result<Vec<Appointment>, BackendError> {
        self.backend
            .request(Method::GET, "/appointment/doctor-appointments", Some(credential), None)
            .await
    }
}

pub fn filter_by_tab(appointments: Vec<Appointment>, tab: AppointmentTab) -> Vec<Appointment> {
    appointments
        .into_iter()
        .filter(|a| tab.matches(&a.appointment_status))
        .collect()
}

/// Newest date first; earliest start first within a day.
pub fn sort_appointments(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| start_key(&a.start_time).cmp(&start_key(&b.start_time)))
    });
}

fn start_key(time: &str) -> (Option<NaiveTime>, String) {
    (parse_time(time), time.to_string())
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()
}

/// `"14:30"` as `"2:30 PM"`; unreadable input comes back unchanged.
pub fn format_time_12h(time: &str) -> String {
    match parse_time(time) {
        Some(t) => t.format("%-I:%M %p").to_string(),
        None => time.to_string(),
    }
}

/// Sorts, then groups consecutive appointments that share a date.
pub fn group_by_date(mut appointments: Vec<Appointment>) -> Vec<AppointmentGroup> {
    sort_appointments(&mut appointments);

    let mut groups: Vec<AppointmentGroup> = Vec::new();
    for appointment in appointments {
        let entry = AppointmentEntry {
            start_display: format_time_12h(&appointment.start_time),
            end_display: appointment.end_time.as_deref().map(format_time_12h),
            appointment,
        };

        match groups.last_mut() {
            Some(group) if group.date == entry.appointment.date => group.appointments.push(entry),
            _ => groups.push(AppointmentGroup {
                date: entry.appointment.date,
                display_date: entry.appointment.date.format("%A, %B %-d, %Y").to_string(),
                appointments: vec![entry],
            }),
        }
    }

    debug!("Grouped appointments into {} days", groups.len());
    groups
}
