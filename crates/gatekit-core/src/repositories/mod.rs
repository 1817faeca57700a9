//! Backend traits (ports)

pub mod principal_backend;
pub mod session_backend;

pub use principal_backend::PrincipalBackend;
pub use session_backend::{PendingWrite, SessionBackend};
