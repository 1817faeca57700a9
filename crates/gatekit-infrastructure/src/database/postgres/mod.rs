//! PostgreSQL backend implementations

pub mod principal_backend_impl;
pub mod session_backend_impl;

pub use principal_backend_impl::PgPrincipalBackend;
pub use session_backend_impl::PgSessionBackend;
