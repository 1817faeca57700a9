// ============================================================================
// Gatekit API - Auth Handlers
// File: crates/gatekit-api/src/handlers/auth.rs
// ============================================================================
//! Authentication HTTP handlers (login, logout, session info)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::response::ApiResponse;
use crate::state::AppState;
use gatekit_core::services::AuthIdentity;
use gatekit_core::DomainError;
use gatekit_shared::PrincipalId;

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authentication response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub principal: PrincipalDto,
    pub token: String,
}

/// Principal DTO for responses
#[derive(Debug, Serialize)]
pub struct PrincipalDto {
    pub id: String,
    pub role: String,
}

impl From<&AuthIdentity> for PrincipalDto {
    fn from(identity: &AuthIdentity) -> Self {
        Self {
            id: identity.principal.id.to_string(),
            role: identity.principal.role.to_string(),
        }
    }
}

/// Login handler - POST /api/v1/auth/login
///
/// On success the session token is returned in the body and set as an
/// HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiResponse<()>>)> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "VALIDATION_ERROR",
                "Email and password are required",
            )),
        ));
    }

    match state.auth.login(&payload.email, &payload.password).await {
        Ok(outcome) => {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                state.config.auth.cookie_name, outcome.token, state.config.auth.session_ttl_secs
            );
            Ok((
                [(header::SET_COOKIE, cookie)],
                Json(ApiResponse::success(AuthResponse {
                    principal: PrincipalDto {
                        id: outcome.principal.id.to_string(),
                        role: outcome.principal.role.to_string(),
                    },
                    token: outcome.token,
                })),
            ))
        }
        Err(DomainError::InvalidCredentials) => Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error(
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            )),
        )),
        Err(e) => {
            tracing::error!("login failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("INTERNAL", "Internal error")),
            ))
        }
    }
}

/// Logout handler - POST /api/v1/auth/logout
///
/// Destroys the session the request resolved to, if any; logging out
/// without one (or twice) is a no-op. The session cookie is cleared either
/// way.
pub async fn logout(
    State(state): State<AppState>,
    identity: Option<Extension<AuthIdentity>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiResponse<()>>)> {
    if let Some(Extension(identity)) = identity {
        state
            .auth
            .logout(&identity.session_id)
            .await
            .map_err(|e| {
                tracing::error!("logout failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("INTERNAL", "Internal error")),
                )
            })?;
    }

    let clear_cookie = format!(
        "{}=; Path=/; HttpOnly; Max-Age=0",
        state.config.auth.cookie_name
    );
    Ok((
        [(header::SET_COOKIE, clear_cookie)],
        Json(ApiResponse::success(())),
    ))
}

/// Revoke-all request payload
#[derive(Debug, Deserialize)]
pub struct RevokeAllRequest {
    pub principal_id: String,
}

/// Revoke-all response
#[derive(Debug, Serialize)]
pub struct RevokeAllResponse {
    pub revoked: usize,
}

/// Revoke-all handler - POST /api/v1/auth/revoke-all (admin only)
///
/// Destroys every session belonging to the given principal. The only client
/// error is a malformed principal id.
pub async fn revoke_all(
    State(state): State<AppState>,
    Json(payload): Json<RevokeAllRequest>,
) -> Result<Json<ApiResponse<RevokeAllResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    let principal_id = PrincipalId::parse(&payload.principal_id).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "VALIDATION_ERROR",
                "Malformed principal id",
            )),
        )
    })?;

    let writes = state
        .sessions
        .delete_all_for_principal(&principal_id)
        .await
        .map_err(internal)?;
    let revoked = writes.len();
    state.sessions.commit(writes).await.map_err(internal)?;

    Ok(Json(ApiResponse::success(RevokeAllResponse { revoked })))
}

fn internal(e: impl std::fmt::Display) -> (StatusCode, Json<ApiResponse<()>>) {
    tracing::error!("session store failure: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error("INTERNAL", "Internal error")),
    )
}

/// Session info handler - GET /api/v1/session (requires authentication)
pub async fn session_info(
    Extension(identity): Extension<AuthIdentity>,
) -> Json<ApiResponse<PrincipalDto>> {
    Json(ApiResponse::success(PrincipalDto::from(&identity)))
}
