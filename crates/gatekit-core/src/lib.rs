//! # Gatekit Core
//!
//! Domain entities, backend ports, the session store, and the component
//! lifecycle runtime.

pub mod clock;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod repositories;
pub mod services;

pub use domain::*;
pub use error::DomainError;
