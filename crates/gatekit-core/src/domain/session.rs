//! Session domain entity

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use gatekit_shared::{PrincipalId, SessionId};

/// A server-side session record: an opaque identifier, a reference to exactly
/// one principal, and an absolute expiry. Valid iff `now < expires_at`;
/// validity is re-checked on every read, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub principal_id: PrincipalId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(principal_id: PrincipalId, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            principal_id,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
