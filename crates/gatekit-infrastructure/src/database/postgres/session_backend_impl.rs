// ============================================================================
// Gatekit Infrastructure - PostgreSQL Session Backend
// File: crates/gatekit-infrastructure/src/database/postgres/session_backend_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

use gatekit_core::domain::Session;
use gatekit_core::error::DomainError;
use gatekit_core::repositories::{PendingWrite, SessionBackend};
use gatekit_shared::{PrincipalId, SessionId};

pub struct PgSessionBackend {
    pool: PgPool,
}

impl PgSessionBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct SessionRow {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            id: row.id.into(),
            principal_id: row.principal_id.into(),
            expires_at: row.expires_at,
        }
    }
}

fn db_err(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

const UPSERT_SESSION: &str = r#"
    INSERT INTO sessions (id, principal_id, expires_at)
    VALUES ($1, $2, $3)
    ON CONFLICT (id) DO UPDATE
    SET principal_id = EXCLUDED.principal_id,
        expires_at = EXCLUDED.expires_at
"#;

const DELETE_SESSION: &str = "DELETE FROM sessions WHERE id = $1";

#[async_trait]
impl SessionBackend for PgSessionBackend {
    async fn find(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, principal_id, expires_at FROM sessions WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("finding session", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn put(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(UPSERT_SESSION)
            .bind(session.id.as_uuid())
            .bind(session.principal_id.as_uuid())
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("writing session", e))?;

        Ok(())
    }

    async fn retract(&self, id: &SessionId) -> Result<(), DomainError> {
        sqlx::query(DELETE_SESSION)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("deleting session", e))?;

        Ok(())
    }

    async fn find_by_principal(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Session>, DomainError> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, principal_id, expires_at FROM sessions WHERE principal_id = $1",
        )
        .bind(principal_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("finding sessions by principal", e))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_expired(&self, as_of: DateTime<Utc>) -> Result<Vec<Session>, DomainError> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, principal_id, expires_at FROM sessions WHERE expires_at <= $1",
        )
        .bind(as_of)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("finding expired sessions", e))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Batched writes run in one transaction.
    async fn apply(&self, writes: Vec<PendingWrite>) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("opening transaction", e))?;

        for write in writes {
            match write {
                PendingWrite::Put(session) => {
                    sqlx::query(UPSERT_SESSION)
                        .bind(session.id.as_uuid())
                        .bind(session.principal_id.as_uuid())
                        .bind(session.expires_at)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| db_err("writing session", e))?;
                }
                PendingWrite::Retract(id) => {
                    sqlx::query(DELETE_SESSION)
                        .bind(id.as_uuid())
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| db_err("deleting session", e))?;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| db_err("committing transaction", e))
    }
}
