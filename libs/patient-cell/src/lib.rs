pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{PatientRecord, UserProfile};
pub use router::patient_routes;
