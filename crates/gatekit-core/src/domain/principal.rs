//! Principal domain entity
//!
//! Principals are owned by the external store; this core only reads the
//! minimal fields needed for authorization and login.

use serde::{Deserialize, Serialize};

use gatekit_shared::{PrincipalId, Role};

/// The identity attached to a request after successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
}

/// Principal fields visible during credential checks. The password hash is
/// absent for principals that cannot log in with a password.
#[derive(Debug, Clone)]
pub struct PrincipalRecord {
    pub id: PrincipalId,
    pub role: Role,
    pub password_hash: Option<String>,
}

impl PrincipalRecord {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role.clone(),
        }
    }
}
