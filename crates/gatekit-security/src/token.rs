//! Signed session-reference tokens
//!
//! Compact HS256 JWTs carrying a session identifier and an absolute expiry.
//! The token itself is never persisted; revoking the referenced session
//! invalidates it regardless of the embedded `exp`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatekit_shared::SessionId;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
}

/// Claims embedded in a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "session-id")]
    pub session_id: String,
    pub exp: i64,
}

/// Signs and verifies session-reference tokens with a symmetric secret.
///
/// The secret is caller-supplied and must be high-entropy: production secrets
/// must be at least 256 bits (32 bytes). Short secrets are a correctness
/// risk for HS256 and are logged at construction, not rejected.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    ttl_seconds: i64,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        let secret = secret.into();
        if secret.len() < gatekit_shared::constants::MIN_TOKEN_SECRET_BYTES {
            tracing::warn!(
                "token secret is shorter than {} bytes; unsuitable for production",
                gatekit_shared::constants::MIN_TOKEN_SECRET_BYTES
            );
        }
        Self {
            secret,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Mints a token referencing `session_id`, expiring `ttl_seconds` from now.
    pub fn sign(&self, session_id: &SessionId) -> Result<String, TokenError> {
        let claims = SessionClaims {
            session_id: session_id.to_string(),
            exp: Utc::now().timestamp() + self.ttl_seconds,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::CreationError(e.to_string()))
    }

    /// Total verification: `None` on a malformed token, bad signature, wrong
    /// secret, or expired `exp`. Never an error — verification failure is an
    /// expected, frequent outcome.
    pub fn verify(&self, token: &str) -> Option<SessionId> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .ok()?;

        SessionId::parse(&data.claims.session_id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn sign_verify_roundtrip() {
        let codec = TokenCodec::new(SECRET, 3600);
        let session_id = SessionId::generate();
        let token = codec.sign(&session_id).unwrap();
        assert_eq!(codec.verify(&token), Some(session_id));
    }

    #[test]
    fn wrong_secret_is_absent() {
        let codec = TokenCodec::new(SECRET, 3600);
        let other = TokenCodec::new("fedcba9876543210fedcba9876543210", 3600);
        let token = codec.sign(&SessionId::generate()).unwrap();
        assert_eq!(other.verify(&token), None);
    }

    #[test]
    fn expired_token_is_absent() {
        let codec = TokenCodec::new(SECRET, -3600);
        let token = codec.sign(&SessionId::generate()).unwrap();
        assert_eq!(codec.verify(&token), None);
    }

    #[test]
    fn malformed_token_is_absent() {
        let codec = TokenCodec::new(SECRET, 3600);
        assert_eq!(codec.verify(""), None);
        assert_eq!(codec.verify("not-a-token"), None);
        assert_eq!(codec.verify("a.b.c"), None);
    }

    #[test]
    fn tampered_payload_is_absent() {
        let codec = TokenCodec::new(SECRET, 3600);
        let token = codec.sign(&SessionId::generate()).unwrap();
        let (head, rest) = token.split_once('.').unwrap();
        let (payload, signature) = rest.split_once('.').unwrap();
        let mut chars: Vec<char> = payload.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered_payload: String = chars.into_iter().collect();
        let tampered = format!("{head}.{tampered_payload}.{signature}");
        assert_eq!(codec.verify(&tampered), None);
    }
}
