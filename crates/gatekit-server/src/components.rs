//! Boot components
//!
//! Each component wires one piece of the runtime into the lifecycle context
//! and registers its own teardown. Ordering matters: later components read
//! what earlier ones put into the context.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Duration;
use sqlx::PgPool;
use tracing::{info, warn};

use gatekit_core::lifecycle::{Component, Context};
use gatekit_core::services::{AuthService, SessionStore};
use gatekit_infrastructure::database::connection;
use gatekit_infrastructure::database::postgres::{PgPrincipalBackend, PgSessionBackend};
use gatekit_security::TokenCodec;
use gatekit_shared::config::{AuthSettings, DatabaseSettings};

/// Connects the Postgres pool, runs migrations, and closes the pool on
/// shutdown.
pub struct DatabaseComponent {
    pub settings: DatabaseSettings,
}

#[async_trait]
impl Component for DatabaseComponent {
    fn name(&self) -> &str {
        "database"
    }

    async fn start(&self, cx: &mut Context) -> anyhow::Result<()> {
        let pool = connection::create_pool(
            &self.settings.url,
            self.settings.max_connections,
            self.settings.min_connections,
        )
        .await?;
        connection::run_migrations(&pool).await?;
        info!("Database connection established");

        cx.insert(pool.clone());
        cx.defer("database", move || async move {
            pool.close().await;
            Ok(())
        });
        Ok(())
    }
}

/// Builds the session store and auth service over the database pool.
pub struct SessionServicesComponent {
    pub settings: AuthSettings,
}

#[async_trait]
impl Component for SessionServicesComponent {
    fn name(&self) -> &str {
        "session-services"
    }

    async fn start(&self, cx: &mut Context) -> anyhow::Result<()> {
        let pool = cx
            .get::<PgPool>()
            .cloned()
            .ok_or_else(|| anyhow!("database component must start first"))?;

        let sessions = SessionStore::new(Arc::new(PgSessionBackend::new(pool.clone())));
        let codec = TokenCodec::new(
            self.settings.token_secret.clone(),
            self.settings.session_ttl_secs,
        );
        let auth = AuthService::new(
            Arc::new(PgPrincipalBackend::new(pool)),
            sessions.clone(),
            codec,
            Duration::seconds(self.settings.session_ttl_secs),
        );

        cx.insert(sessions);
        cx.insert(auth);
        Ok(())
    }
}

/// Periodically deletes expired sessions (optional batch cleanup; expiry is
/// otherwise lazy).
pub struct SweeperComponent {
    pub interval: StdDuration,
}

#[async_trait]
impl Component for SweeperComponent {
    fn name(&self) -> &str {
        "session-sweeper"
    }

    async fn start(&self, cx: &mut Context) -> anyhow::Result<()> {
        let sessions = cx
            .get::<SessionStore>()
            .cloned()
            .ok_or_else(|| anyhow!("session-services component must start first"))?;

        let interval = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // immediate first tick
            loop {
                ticker.tick().await;
                match sessions.cleanup_expired().await {
                    Ok(writes) if !writes.is_empty() => {
                        let count = writes.len();
                        match sessions.commit(writes).await {
                            Ok(()) => info!("swept {} expired sessions", count),
                            Err(e) => warn!("session sweep commit failed: {}", e),
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("session sweep failed: {}", e),
                }
            }
        });

        cx.defer("session-sweeper", move || async move {
            handle.abort();
            Ok(())
        });
        Ok(())
    }
}
