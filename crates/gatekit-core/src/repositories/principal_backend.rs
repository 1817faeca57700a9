//! Principal backend trait (port)

use async_trait::async_trait;

use crate::domain::{Principal, PrincipalRecord};
use crate::error::DomainError;
use gatekit_shared::PrincipalId;

/// Read-only view over the externally owned principal store. Principal
/// lifecycle (creation, removal, role changes) stays external.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrincipalBackend: Send + Sync {
    async fn find_by_id(&self, id: &PrincipalId) -> Result<Option<Principal>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, DomainError>;
}
