pub mod extractor;
pub mod jwt;
pub mod session;
pub mod test_utils;

pub use session::{IdentityProvider, SessionContext, StaticIdentity};
