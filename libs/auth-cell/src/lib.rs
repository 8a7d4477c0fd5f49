pub mod guard;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use guard::{Navigator, PortalNavigator, SignInGuard};
pub use router::auth_routes;
