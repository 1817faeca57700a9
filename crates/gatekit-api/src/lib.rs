//! # Gatekit API
//!
//! HTTP layer: identity-resolution and enforcement middleware, auth
//! handlers, and the API response envelope.

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod state;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use state::AppState;

/// Builds the application router. Identity resolution runs on every route;
/// enforcement is per-route.
pub fn router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/api/v1/session", get(handlers::auth::session_info))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_authenticated,
        ));

    let admin = Router::new()
        .route("/api/v1/auth/revoke-all", post(handlers::auth::revoke_all))
        .route_layer(from_fn_with_state(
            middleware::auth::RoleGate::new(state.clone(), &["admin"]),
            middleware::auth::require_role,
        ));

    Router::new()
        .merge(authenticated)
        .merge(admin)
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::resolve_identity,
        ))
        .layer(from_fn(middleware::csrf::attach_csrf_token))
        .with_state(state)
}
