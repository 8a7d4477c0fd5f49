pub mod booking;
pub mod listing;

pub use booking::{AppointmentWriter, AvailabilityProvider, BookingBackend, BookingService};
pub use listing::AppointmentListService;
