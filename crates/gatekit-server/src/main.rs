mod components;

use std::net::SocketAddr;
use std::time::Duration as StdDuration;

use anyhow::anyhow;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use components::{DatabaseComponent, SessionServicesComponent, SweeperComponent};
use gatekit_api::state::AppState;
use gatekit_core::lifecycle::{self, Component, Context};
use gatekit_core::services::{AuthService, SessionStore};
use gatekit_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    gatekit_shared::telemetry::init_telemetry();

    info!("Gatekit server starting...");

    // Load configuration; a missing required setting is fatal.
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Boot sequence: components run strictly in order, each registering its
    // own teardown.
    let components: Vec<Box<dyn Component>> = vec![
        Box::new(DatabaseComponent {
            settings: config.database.clone(),
        }),
        Box::new(SessionServicesComponent {
            settings: config.auth.clone(),
        }),
        Box::new(SweeperComponent {
            interval: StdDuration::from_secs(config.auth.sweep_interval_secs),
        }),
    ];
    let cx = lifecycle::start(Context::new(), &components).await?;

    let sessions = cx
        .get::<SessionStore>()
        .cloned()
        .ok_or_else(|| anyhow!("session store missing from context"))?;
    let auth = cx
        .get::<AuthService>()
        .cloned()
        .ok_or_else(|| anyhow!("auth service missing from context"))?;

    let state = AppState {
        auth,
        sessions,
        config: config.clone(),
    };

    let app = gatekit_api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Reverse-order teardown: sweeper, services, database.
    info!("Shutting down");
    lifecycle::stop(cx).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
    }
}
