//! # Gatekit Shared
//!
//! Shared types, configuration, constants, and telemetry for gatekit.

pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use error::AppError;
pub use types::{PrincipalId, Role, SessionId};
