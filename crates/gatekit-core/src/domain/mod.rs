//! Domain entities

pub mod principal;
pub mod session;

pub use principal::{Principal, PrincipalRecord};
pub use session::Session;
