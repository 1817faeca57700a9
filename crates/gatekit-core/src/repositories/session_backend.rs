//! Session backend trait (port)
//!
//! The single explicit database interface all session call sites require.
//! Exactly four capabilities: point lookup, upsert, retraction, and
//! predicate queries (sessions for a principal, sessions expired at an
//! instant). Convenience coercions belong at the adapter boundary, not here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Session;
use crate::error::DomainError;
use gatekit_shared::{PrincipalId, SessionId};

/// A deferred persistence operation. Returned by [`SessionStore`] mutations
/// so callers can batch several writes into one backend round trip.
///
/// [`SessionStore`]: crate::services::SessionStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    Put(Session),
    Retract(SessionId),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn find(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    async fn put(&self, session: &Session) -> Result<(), DomainError>;

    async fn retract(&self, id: &SessionId) -> Result<(), DomainError>;

    async fn find_by_principal(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Session>, DomainError>;

    /// All sessions with `expires_at <= as_of`.
    async fn find_expired(&self, as_of: DateTime<Utc>) -> Result<Vec<Session>, DomainError>;

    /// Applies a batch of deferred writes. Implementations may override this
    /// to make the batch atomic.
    async fn apply(&self, writes: Vec<PendingWrite>) -> Result<(), DomainError> {
        for write in writes {
            match write {
                PendingWrite::Put(session) => self.put(&session).await?,
                PendingWrite::Retract(id) => self.retract(&id).await?,
            }
        }
        Ok(())
    }
}
