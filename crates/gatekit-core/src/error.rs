//! Domain errors
//!
//! Authentication failures (bad/expired/missing token, unknown session) are
//! never errors — they surface as `None`/unauthenticated. Errors here are
//! the genuinely unexpected cases.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    /// Store-layer failure, propagated unchanged. No retry policy here.
    #[error("Database error: {0}")]
    DatabaseError(String),
}
