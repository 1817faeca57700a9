//! Session store service
//!
//! CRUD over session records with lazy expiry. Mutations return deferred
//! [`PendingWrite`]s so callers can batch them; reads go straight to the
//! backend and re-check expiry every time.

use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::domain::Session;
use crate::error::DomainError;
use crate::repositories::{PendingWrite, SessionBackend};
use gatekit_shared::{PrincipalId, SessionId};

#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn SessionBackend>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    pub fn with_clock(backend: Arc<dyn SessionBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// Creates a session for `principal_id` expiring `ttl` from now. The
    /// record is not persisted until the returned write is committed.
    pub fn create(&self, principal_id: PrincipalId, ttl: Duration) -> (SessionId, PendingWrite) {
        let session = Session::new(principal_id, ttl, self.clock.now());
        let id = session.id;
        debug!(session_id = %id, principal_id = %principal_id, "session created");
        (id, PendingWrite::Put(session))
    }

    /// Looks up a live session. `None` covers both "no such record" and
    /// "expired" — the two are deliberately indistinguishable so callers
    /// cannot probe for the existence of expired sessions.
    pub async fn get(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let now = self.clock.now();
        Ok(self
            .backend
            .find(id)
            .await?
            .filter(|session| !session.is_expired_at(now)))
    }

    /// Deferred delete. `None` when no live session exists — deleting an
    /// already-deleted session is a no-op.
    pub async fn delete(&self, id: &SessionId) -> Result<Option<PendingWrite>, DomainError> {
        Ok(self.get(id).await?.map(|s| PendingWrite::Retract(s.id)))
    }

    /// One deferred delete per existing session referencing the principal.
    pub async fn delete_all_for_principal(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<PendingWrite>, DomainError> {
        let sessions = self.backend.find_by_principal(principal_id).await?;
        Ok(sessions
            .into_iter()
            .map(|s| PendingWrite::Retract(s.id))
            .collect())
    }

    /// One deferred delete per expired session, evaluated against a single
    /// `now` snapshot for the whole call.
    pub async fn cleanup_expired(&self) -> Result<Vec<PendingWrite>, DomainError> {
        let as_of = self.clock.now();
        let expired = self.backend.find_expired(as_of).await?;
        if !expired.is_empty() {
            debug!(count = expired.len(), %as_of, "expired sessions found");
        }
        Ok(expired
            .into_iter()
            .map(|s| PendingWrite::Retract(s.id))
            .collect())
    }

    /// Applies a batch of deferred writes through the backend.
    pub async fn commit(&self, writes: Vec<PendingWrite>) -> Result<(), DomainError> {
        if writes.is_empty() {
            return Ok(());
        }
        self.backend.apply(writes).await
    }
}
