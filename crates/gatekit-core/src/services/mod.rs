//! Core services

pub mod auth_service;
pub mod session_store;

pub use auth_service::{AuthIdentity, AuthService, LoginOutcome};
pub use session_store::SessionStore;
