pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Doctor, DoctorVerification, VerificationStatus};
pub use router::{admin_routes, doctor_routes};
pub use services::{DoctorService, VerificationService};
