// ============================================================================
// Gatekit API - Auth Middleware
// File: crates/gatekit-api/src/middleware/auth.rs
// ============================================================================
//! Identity resolution and enforcement gates
//!
//! Resolution tries, in order: a pre-attached identity extension (from an
//! upstream session decoder), a `Bearer` authorization header, then a named
//! cookie. The first source yielding a principal wins; nothing is merged.
//! A request that resolves nothing proceeds unauthenticated — enforcement is
//! a separate, composable step.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::response::ApiResponse;
use crate::state::AppState;
use gatekit_core::services::AuthIdentity;
use gatekit_core::DomainError;
use gatekit_shared::Role;

/// Resolves the request's identity and attaches it as an [`AuthIdentity`]
/// extension. Invalid or expired tokens are silently treated as "no
/// session"; only store-layer failures produce an error response.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.extensions().get::<AuthIdentity>().is_some() {
        return next.run(req).await;
    }

    let bearer = bearer_token(req.headers()).map(str::to_string);
    let cookie = cookie_value(req.headers(), &state.config.auth.cookie_name).map(str::to_string);

    for token in [bearer, cookie].into_iter().flatten() {
        match state.auth.authenticate_token(&token).await {
            Ok(Some(identity)) => {
                req.extensions_mut().insert(identity);
                break;
            }
            Ok(None) => continue,
            Err(e) => return store_failure(e),
        }
    }

    next.run(req).await
}

/// Rejects requests that resolved no principal. 401 with a message, or a
/// 302 redirect when a login URL is configured.
pub async fn require_authenticated(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if req.extensions().get::<AuthIdentity>().is_some() {
        return next.run(req).await;
    }
    reject(
        state.config.auth.login_url.as_deref(),
        StatusCode::UNAUTHORIZED,
        "UNAUTHENTICATED",
        "Authentication required",
    )
}

/// State for [`require_role`]: the app state plus the allowed role set.
#[derive(Clone)]
pub struct RoleGate {
    state: AppState,
    allowed: Arc<[Role]>,
}

impl RoleGate {
    pub fn new(state: AppState, allowed: &[&str]) -> Self {
        Self {
            state,
            allowed: allowed.iter().map(|r| Role::from(*r)).collect(),
        }
    }
}

/// Rejects requests with no principal or a principal outside the allowed
/// role set. 403 with a message, or a 302 redirect when a login URL is
/// configured.
pub async fn require_role(State(gate): State<RoleGate>, req: Request, next: Next) -> Response {
    let authorized = req
        .extensions()
        .get::<AuthIdentity>()
        .is_some_and(|identity| gate.allowed.contains(&identity.principal.role));

    if authorized {
        return next.run(req).await;
    }
    reject(
        gate.state.config.auth.login_url.as_deref(),
        StatusCode::FORBIDDEN,
        "FORBIDDEN",
        "Insufficient role",
    )
}

fn reject(login_url: Option<&str>, status: StatusCode, code: &str, message: &str) -> Response {
    match login_url {
        Some(url) => (
            StatusCode::FOUND,
            [(header::LOCATION, url.to_string())],
        )
            .into_response(),
        None => (status, Json(ApiResponse::<()>::error(code, message))).into_response(),
    }
}

fn store_failure(e: DomainError) -> Response {
    error!("store failure during identity resolution: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL", "Internal error")),
    )
        .into_response()
}

/// Extracts a bearer token. The `"Bearer "` prefix is case-sensitive.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Router,
    };
    use chrono::Duration;
    use tower::ServiceExt;

    use super::*;
    use gatekit_core::domain::{Principal, PrincipalRecord};
    use gatekit_core::services::{AuthService, SessionStore};
    use gatekit_infrastructure::database::memory::{
        InMemoryPrincipalBackend, InMemorySessionBackend,
    };
    use gatekit_security::TokenCodec;
    use gatekit_shared::config::{AppConfig, AppSettings, AuthSettings, DatabaseSettings};
    use gatekit_shared::{PrincipalId, SessionId};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn test_config(login_url: Option<String>) -> AppConfig {
        AppConfig {
            app: AppSettings {
                env: "test".into(),
                host: "127.0.0.1".into(),
                port: 0,
                name: "gatekit-test".into(),
            },
            database: DatabaseSettings {
                url: "postgres://unused".into(),
                max_connections: 1,
                min_connections: 1,
            },
            auth: AuthSettings {
                token_secret: SECRET.into(),
                session_ttl_secs: 3600,
                cookie_name: "gatekit_session".into(),
                login_url,
                sweep_interval_secs: 3600,
            },
        }
    }

    struct Fixture {
        state: AppState,
        principals: Arc<InMemoryPrincipalBackend>,
    }

    fn fixture(login_url: Option<String>) -> Fixture {
        let sessions = SessionStore::new(Arc::new(InMemorySessionBackend::new()));
        let principals = Arc::new(InMemoryPrincipalBackend::new());
        let config = test_config(login_url);
        let auth = AuthService::new(
            principals.clone(),
            sessions.clone(),
            TokenCodec::new(SECRET, config.auth.session_ttl_secs),
            Duration::seconds(config.auth.session_ttl_secs),
        );
        Fixture {
            state: AppState {
                auth,
                sessions,
                config,
            },
            principals,
        }
    }

    /// Registers a principal with the given role and opens a session for it,
    /// returning a valid signed token.
    async fn signed_in(fx: &Fixture, role: &str) -> String {
        let record = PrincipalRecord {
            id: PrincipalId::generate(),
            role: role.into(),
            password_hash: None,
        };
        fx.principals.insert("user@example.com", record.clone());

        let (session_id, write) = fx.state.sessions.create(record.id, Duration::hours(1));
        fx.state.sessions.commit(vec![write]).await.unwrap();
        TokenCodec::new(SECRET, 3600).sign(&session_id).unwrap()
    }

    async fn ok() -> &'static str {
        "ok"
    }

    fn protected_router(state: AppState) -> Router {
        Router::new()
            .route("/protected", get(ok))
            .route_layer(from_fn_with_state(state.clone(), require_authenticated))
            .layer(from_fn_with_state(state, resolve_identity))
    }

    fn role_router(state: AppState, allowed: &[&str]) -> Router {
        Router::new()
            .route("/admin", get(ok))
            .route_layer(from_fn_with_state(
                RoleGate::new(state.clone(), allowed),
                require_role,
            ))
            .layer(from_fn_with_state(state, resolve_identity))
    }

    fn get_request(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn unauthenticated_request_is_rejected_with_401() {
        let fx = fixture(None);
        let res = protected_router(fx.state)
            .oneshot(get_request("/protected"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unauthenticated_request_redirects_when_configured() {
        let fx = fixture(Some("/login".into()));
        let res = protected_router(fx.state)
            .oneshot(get_request("/protected"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        let location = res.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, "/login");
    }

    #[tokio::test]
    async fn valid_bearer_token_passes() {
        let fx = fixture(None);
        let token = signed_in(&fx, "member").await;

        let req = HttpRequest::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = protected_router(fx.state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bearer_prefix_is_case_sensitive() {
        let fx = fixture(None);
        let token = signed_in(&fx, "member").await;

        let req = HttpRequest::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = protected_router(fx.state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_cookie_token_passes() {
        let fx = fixture(None);
        let token = signed_in(&fx, "member").await;

        let req = HttpRequest::builder()
            .uri("/protected")
            .header(header::COOKIE, format!("other=1; gatekit_session={token}"))
            .body(Body::empty())
            .unwrap();
        let res = protected_router(fx.state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn tampered_token_is_treated_as_no_session() {
        let fx = fixture(None);
        let token = signed_in(&fx, "member").await;
        let tampered = format!("{}x", token);

        let req = HttpRequest::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("Bearer {tampered}"))
            .body(Body::empty())
            .unwrap();
        let res = protected_router(fx.state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_for_revoked_session_is_rejected() {
        let fx = fixture(None);
        let token = signed_in(&fx, "member").await;

        // Revoke the underlying session; the token's embedded expiry is
        // still in the future.
        let session_id = TokenCodec::new(SECRET, 3600).verify(&token).unwrap();
        let write = fx.state.sessions.delete(&session_id).await.unwrap().unwrap();
        fx.state.sessions.commit(vec![write]).await.unwrap();

        let req = HttpRequest::builder()
            .uri("/protected")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = protected_router(fx.state).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn pre_attached_identity_wins_over_token_sources() {
        let fx = fixture(None);
        let identity = AuthIdentity {
            session_id: SessionId::generate(),
            principal: Principal {
                id: PrincipalId::generate(),
                role: "member".into(),
            },
        };

        // No token anywhere; the upstream decoder already attached the
        // identity.
        let app = Router::new()
            .route("/protected", get(ok))
            .route_layer(from_fn_with_state(fx.state.clone(), require_authenticated))
            .layer(from_fn_with_state(fx.state, resolve_identity))
            .layer(Extension(identity));
        let res = app.oneshot(get_request("/protected")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn require_role_passes_allowed_role() {
        let fx = fixture(None);
        let token = signed_in(&fx, "admin").await;

        let req = HttpRequest::builder()
            .uri("/admin")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = role_router(fx.state, &["admin", "owner"])
            .oneshot(req)
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn require_role_rejects_wrong_role_with_403() {
        let fx = fixture(None);
        let token = signed_in(&fx, "member").await;

        let req = HttpRequest::builder()
            .uri("/admin")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let res = role_router(fx.state, &["admin"]).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn require_role_rejects_unauthenticated_request() {
        let fx = fixture(None);
        let res = role_router(fx.state, &["admin"])
            .oneshot(get_request("/admin"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
