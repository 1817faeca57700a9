//! # Gatekit Security
//!
//! Stateless security primitives: signed session tokens, password hashing,
//! CSRF tokens.

pub mod csrf;
pub mod password;
pub mod token;

pub use token::TokenCodec;
