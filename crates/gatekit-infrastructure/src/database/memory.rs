//! In-memory backends
//!
//! Map-backed implementations of the core ports, for tests and local
//! development. Safe for concurrent use; reads and writes may interleave
//! arbitrarily across requests (last write wins, as per the store contract).

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gatekit_core::domain::{Principal, PrincipalRecord, Session};
use gatekit_core::error::DomainError;
use gatekit_core::repositories::{PrincipalBackend, SessionBackend};
use gatekit_shared::{PrincipalId, SessionId};

#[derive(Default)]
pub struct InMemorySessionBackend {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<SessionId, Session>> {
        self.sessions.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionBackend for InMemorySessionBackend {
    async fn find(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.read().get(id).cloned())
    }

    async fn put(&self, session: &Session) -> Result<(), DomainError> {
        self.write().insert(session.id, session.clone());
        Ok(())
    }

    async fn retract(&self, id: &SessionId) -> Result<(), DomainError> {
        self.write().remove(id);
        Ok(())
    }

    async fn find_by_principal(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Session>, DomainError> {
        Ok(self
            .read()
            .values()
            .filter(|s| s.principal_id == *principal_id)
            .cloned()
            .collect())
    }

    async fn find_expired(&self, as_of: DateTime<Utc>) -> Result<Vec<Session>, DomainError> {
        Ok(self
            .read()
            .values()
            .filter(|s| s.is_expired_at(as_of))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryPrincipalBackend {
    principals: RwLock<HashMap<PrincipalId, (String, PrincipalRecord)>>,
}

impl InMemoryPrincipalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, email: &str, record: PrincipalRecord) {
        self.principals
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id, (email.to_lowercase(), record));
    }
}

#[async_trait]
impl PrincipalBackend for InMemoryPrincipalBackend {
    async fn find_by_id(&self, id: &PrincipalId) -> Result<Option<Principal>, DomainError> {
        Ok(self
            .principals
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .map(|(_, record)| record.principal()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, DomainError> {
        let wanted = email.to_lowercase();
        Ok(self
            .principals
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .find(|(stored, _)| *stored == wanted)
            .map(|(_, record)| record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use gatekit_core::repositories::PendingWrite;
    use gatekit_shared::Role;

    use super::*;

    fn session(principal_id: PrincipalId, ttl: Duration) -> Session {
        Session::new(principal_id, ttl, Utc::now())
    }

    #[tokio::test]
    async fn put_find_retract() {
        let backend = InMemorySessionBackend::new();
        let s = session(PrincipalId::generate(), Duration::hours(1));

        backend.put(&s).await.unwrap();
        assert_eq!(backend.find(&s.id).await.unwrap(), Some(s.clone()));

        backend.retract(&s.id).await.unwrap();
        assert_eq!(backend.find(&s.id).await.unwrap(), None);
        // Retracting again is harmless.
        backend.retract(&s.id).await.unwrap();
    }

    #[tokio::test]
    async fn predicate_queries() {
        let backend = InMemorySessionBackend::new();
        let principal = PrincipalId::generate();

        let live = session(principal, Duration::hours(1));
        let expired = session(principal, Duration::hours(-1));
        let other = session(PrincipalId::generate(), Duration::hours(1));
        for s in [&live, &expired, &other] {
            backend.put(s).await.unwrap();
        }

        let mine = backend.find_by_principal(&principal).await.unwrap();
        assert_eq!(mine.len(), 2);

        let stale = backend.find_expired(Utc::now()).await.unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, expired.id);
    }

    #[tokio::test]
    async fn apply_batches_writes() {
        let backend = InMemorySessionBackend::new();
        let a = session(PrincipalId::generate(), Duration::hours(1));
        let b = session(PrincipalId::generate(), Duration::hours(1));

        backend
            .apply(vec![
                PendingWrite::Put(a.clone()),
                PendingWrite::Put(b.clone()),
                PendingWrite::Retract(a.id),
            ])
            .await
            .unwrap();

        assert_eq!(backend.find(&a.id).await.unwrap(), None);
        assert_eq!(backend.find(&b.id).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn principal_lookup_is_case_insensitive_on_email() {
        let backend = InMemoryPrincipalBackend::new();
        let record = PrincipalRecord {
            id: PrincipalId::generate(),
            role: Role::from("admin"),
            password_hash: None,
        };
        backend.insert("Alice@Example.com", record.clone());

        let found = backend
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .expect("principal found");
        assert_eq!(found.id, record.id);

        let principal = backend.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(principal.role, Role::from("admin"));
    }
}
