use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::api::types::{LoginResponse, UserDto};
use crate::services::PublicUser;

/// The caller resolved by the auth middleware, passed to handlers through
/// request extensions rather than any ambient state.
#[derive(Debug, Clone)]
pub struct AuthedUser(pub PublicUser);

/// The raw bearer token the caller presented (needed by logout).
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Accepted for wire compatibility; has no behavioral effect.
    #[serde(default)]
    pub remember: bool,
}

// ============================================================================
// Middleware
// ============================================================================

/// Authentication middleware: resolves `Authorization: Bearer <token>` to a
/// live user and stores it in request extensions. Any role passes.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    gate(state, headers, request, next, &[]).await
}

/// Role gate for item mutation: authentication plus the admin role.
pub async fn admin_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    gate(state, headers, request, next, &["admin"]).await
}

async fn gate(
    state: Arc<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
    required_roles: &[&str],
) -> Result<axum::response::Response, ApiError> {
    let token = extract_bearer(&headers).ok_or(ApiError::Unauthenticated)?;

    let user = state.auth().authorize(&token, required_roles).await?;

    tracing::Span::current().record("user_id", user.id);

    request.extensions_mut().insert(AuthedUser(user));
    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer` header
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/login
/// Authenticate with email and password, returns a fresh bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("email", "The email field is required."));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::validation(
            "password",
            "The password field must be at least 6 characters.",
        ));
    }

    let result = state
        .auth()
        .login(&payload.email, &payload.password, payload.remember)
        .await?;

    Ok(Json(LoginResponse {
        user: UserDto::from(result.user),
        token: result.token,
    }))
}

/// POST /api/logout
/// Revoke the presented token; the session behind it is gone afterwards
pub async fn logout(
    State(state): State<Arc<AppState>>,
    axum::Extension(token): axum::Extension<BearerToken>,
) -> Result<StatusCode, ApiError> {
    state.auth().logout(&token.0).await?;
    Ok(StatusCode::OK)
}
