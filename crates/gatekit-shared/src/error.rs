//! Startup errors
//!
//! Anything here is fatal before the server binds; request-path failures
//! live in the core's `DomainError` instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
