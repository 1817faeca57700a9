//! Authentication service
//!
//! Composes credential checks, the session store, and the token codec into
//! login/logout flows and bearer-token resolution.

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use crate::domain::Principal;
use crate::error::DomainError;
use crate::repositories::PrincipalBackend;
use crate::services::SessionStore;
use gatekit_security::password::verify as verify_password;
use gatekit_security::TokenCodec;
use gatekit_shared::{utils::mask_email, SessionId};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub principal: Principal,
    pub session_id: SessionId,
    pub token: String,
}

/// The identity a request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub session_id: SessionId,
    pub principal: Principal,
}

#[derive(Clone)]
pub struct AuthService {
    principals: Arc<dyn PrincipalBackend>,
    sessions: SessionStore,
    codec: TokenCodec,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        principals: Arc<dyn PrincipalBackend>,
        sessions: SessionStore,
        codec: TokenCodec,
        session_ttl: Duration,
    ) -> Self {
        Self {
            principals,
            sessions,
            codec,
            session_ttl,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Login with email and password. Creates and persists a session and
    /// mints a token referencing it. Unknown email and wrong password are
    /// the same `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, DomainError> {
        let record = self.principals.find_by_email(email).await?.ok_or_else(|| {
            warn!(email = %mask_email(email), "login failed: unknown email");
            DomainError::InvalidCredentials
        })?;

        let stored_hash = record
            .password_hash
            .as_deref()
            .ok_or(DomainError::InvalidCredentials)?;

        let password_valid = verify_password(password, stored_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !password_valid {
            warn!(email = %mask_email(email), "login failed: invalid password");
            return Err(DomainError::InvalidCredentials);
        }

        let (session_id, write) = self.sessions.create(record.id, self.session_ttl);
        self.sessions.commit(vec![write]).await?;

        let token = self
            .codec
            .sign(&session_id)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        info!(email = %mask_email(email), %session_id, "login successful");

        Ok(LoginOutcome {
            principal: record.principal(),
            session_id,
            token,
        })
    }

    /// Destroys the session. Returns whether a live session existed; logging
    /// out twice is a no-op.
    pub async fn logout(&self, session_id: &SessionId) -> Result<bool, DomainError> {
        match self.sessions.delete(session_id).await? {
            Some(write) => {
                self.sessions.commit(vec![write]).await?;
                info!(%session_id, "logged out");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Resolves a bearer/cookie token to an identity: verify the signature,
    /// look up the referenced session, then the principal. Any failure along
    /// the way is `Ok(None)` — an unauthenticated request, not an error.
    pub async fn authenticate_token(
        &self,
        token: &str,
    ) -> Result<Option<AuthIdentity>, DomainError> {
        let Some(session_id) = self.codec.verify(token) else {
            return Ok(None);
        };
        let Some(session) = self.sessions.get(&session_id).await? else {
            return Ok(None);
        };
        let principal = self.principals.find_by_id(&session.principal_id).await?;
        Ok(principal.map(|principal| AuthIdentity {
            session_id,
            principal,
        }))
    }
}
