//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{Store, User};
use crate::services::auth_service::{AuthError, AuthService, LoginResult, PublicUser};

pub struct SeaOrmAuthService {
    store: Store,
    /// Token lifetime in hours; 0 disables expiry.
    token_ttl_hours: u32,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, token_ttl_hours: u32) -> Self {
        Self {
            store,
            token_ttl_hours,
        }
    }
}

fn public(user: User) -> PublicUser {
    PublicUser {
        id: user.id,
        email: user.email,
        role: user.role,
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(
        &self,
        email: &str,
        password: &str,
        _remember: bool,
    ) -> Result<LoginResult, AuthError> {
        // One combined lookup-and-verify; unknown email and wrong password
        // are indistinguishable from here out.
        let user = self
            .store
            .verify_user_password(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.store.issue_token(user.id).await?;

        info!(user_id = user.id, "User logged in");

        Ok(LoginResult {
            user: public(user),
            token,
        })
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store.revoke_token(token).await?;
        Ok(())
    }

    async fn authorize(
        &self,
        token: &str,
        required_roles: &[&str],
    ) -> Result<PublicUser, AuthError> {
        let user = self
            .store
            .resolve_token(token, self.token_ttl_hours)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if !required_roles.is_empty() && !required_roles.contains(&user.role.as_str()) {
            return Err(AuthError::Forbidden);
        }

        Ok(public(user))
    }
}
