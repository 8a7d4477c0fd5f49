pub mod auth;
pub mod validation;

pub use auth::{AuthError, AuthService};
