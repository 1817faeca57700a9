//! Password hashing
//!
//! Argon2id with per-password random salts, encoded as PHC strings. Hash
//! parameters travel inside the PHC string, so they can be tightened later
//! without invalidating stored hashes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Unreadable password hash: {0}")]
    MalformedHash(String),

    #[error("Hashing failed: {0}")]
    HashingFailed(String),
}

/// Hashes a plaintext password into a PHC-formatted string.
pub fn hash(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Checks a plaintext password against a stored PHC string. A mismatch is
/// `Ok(false)`; only an unreadable stored hash is an error.
pub fn verify(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
