pub mod doctor;
pub mod validation;
pub mod verification;

pub use doctor::{DoctorError, DoctorService};
pub use verification::{VerificationFilter, VerificationService};
