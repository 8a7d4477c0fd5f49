pub mod availability;
pub mod calendar;
pub mod handlers;
pub mod models;
pub mod router;
pub mod selector;
pub mod services;
pub mod session;
pub mod wire;

pub use router::{appointment_list_routes, booking_routes};
pub use selector::{SelectionError, SlotSelector};
pub use session::BookingSession;
