//! Domain service for authentication and authorization.
//!
//! Handles credential verification, bearer-token issuance and revocation,
//! and the per-request role check backing the HTTP middleware.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password both map here; callers must not be
    /// able to tell the two apart.
    #[error("email or password is incorrect.")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Public view of a user; the password hash never appears here.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
    pub role: String,
}

/// Login result: the authenticated user and a freshly issued bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user: PublicUser,
    pub token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a fresh token bound to the user.
    ///
    /// `remember` is accepted for wire compatibility and has no effect:
    /// tokens are server-side rows with a single config-driven lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on any credential mismatch.
    async fn login(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<LoginResult, AuthError>;

    /// Revokes the caller's current token. Idempotent: revoking a token
    /// that is already gone is a no-op.
    async fn logout(&self, token: &str) -> Result<(), AuthError>;

    /// Resolves a bearer token to its live owner, then checks role
    /// membership. The role gate.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthenticated`] when the token is missing, unknown,
    /// or expired; [`AuthError::Forbidden`] when the role does not match.
    async fn authorize(
        &self,
        token: &str,
        required_roles: &[&str],
    ) -> Result<PublicUser, AuthError>;
}
