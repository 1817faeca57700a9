// ============================================================================
// Gatekit Infrastructure - PostgreSQL Principal Backend
// File: crates/gatekit-infrastructure/src/database/postgres/principal_backend_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use gatekit_core::domain::{Principal, PrincipalRecord};
use gatekit_core::error::DomainError;
use gatekit_core::repositories::PrincipalBackend;
use gatekit_shared::{PrincipalId, Role};

pub struct PgPrincipalBackend {
    pool: PgPool,
}

impl PgPrincipalBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    pub id: Uuid,
    pub role: String,
    pub password_hash: Option<String>,
}

impl From<PrincipalRow> for PrincipalRecord {
    fn from(row: PrincipalRow) -> Self {
        PrincipalRecord {
            id: row.id.into(),
            role: Role::new(row.role),
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl PrincipalBackend for PgPrincipalBackend {
    async fn find_by_id(&self, id: &PrincipalId) -> Result<Option<Principal>, DomainError> {
        let row: Option<PrincipalRow> = sqlx::query_as(
            "SELECT id, role, password_hash FROM principals WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding principal by id: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| PrincipalRecord::from(r).principal()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<PrincipalRecord>, DomainError> {
        let row: Option<PrincipalRow> = sqlx::query_as(
            "SELECT id, role, password_hash FROM principals WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding principal by email: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }
}
