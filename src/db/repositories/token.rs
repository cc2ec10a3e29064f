use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::tokens;

use super::user::User;

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Issue a fresh token bound to the given user.
    pub async fn issue(&self, user_id: i32) -> Result<String> {
        let token = generate_token();
        let now = Utc::now().to_rfc3339();

        let active = tokens::ActiveModel {
            user_id: Set(user_id),
            token: Set(token.clone()),
            abilities: Set(None),
            created_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert token")?;

        Ok(token)
    }

    /// Resolve a token string to its owning user.
    ///
    /// When `ttl_hours` is non-zero, tokens older than the TTL are treated
    /// as invalid and deleted on the spot.
    pub async fn resolve(&self, token: &str, ttl_hours: u32) -> Result<Option<User>> {
        let found = tokens::Entity::find()
            .filter(tokens::Column::Token.eq(token))
            .find_also_related(crate::entities::users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query token")?;

        let Some((row, user)) = found else {
            return Ok(None);
        };

        if ttl_hours > 0 && is_expired(&row.created_at, ttl_hours) {
            tokens::Entity::delete_by_id(row.id)
                .exec(&self.conn)
                .await
                .context("Failed to delete expired token")?;
            return Ok(None);
        }

        Ok(user.map(User::from))
    }

    /// Delete a token by its string. Absent tokens are a no-op (idempotent
    /// logout).
    pub async fn revoke(&self, token: &str) -> Result<()> {
        tokens::Entity::delete_many()
            .filter(tokens::Column::Token.eq(token))
            .exec(&self.conn)
            .await
            .context("Failed to delete token")?;

        Ok(())
    }
}

fn is_expired(created_at: &str, ttl_hours: u32) -> bool {
    // Unparseable timestamps count as expired rather than immortal.
    DateTime::parse_from_rfc3339(created_at).map_or(true, |created| {
        let age = Utc::now().signed_duration_since(created.with_timezone(&Utc));
        age > chrono::Duration::hours(i64::from(ttl_hours))
    })
}

/// Generate a random opaque token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_is_expired() {
        let fresh = Utc::now().to_rfc3339();
        assert!(!is_expired(&fresh, 1));

        let old = (Utc::now() - chrono::Duration::hours(3)).to_rfc3339();
        assert!(is_expired(&old, 2));
        assert!(!is_expired(&old, 4));

        assert!(is_expired("not-a-timestamp", 1));
    }
}
