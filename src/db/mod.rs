use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::item::{ItemFilter, ItemRecord};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn item_repo(&self) -> repositories::item::ItemRepository {
        repositories::item::ItemRepository::new(self.conn.clone())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn verify_user_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        role: &str,
        config: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(email, password, role, config).await
    }

    pub async fn update_user_password(
        &self,
        email: &str,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(email, new_password, config)
            .await
    }

    pub async fn issue_token(&self, user_id: i32) -> Result<String> {
        self.token_repo().issue(user_id).await
    }

    pub async fn resolve_token(&self, token: &str, ttl_hours: u32) -> Result<Option<User>> {
        self.token_repo().resolve(token, ttl_hours).await
    }

    pub async fn revoke_token(&self, token: &str) -> Result<()> {
        self.token_repo().revoke(token).await
    }

    pub async fn list_items(&self, filter: ItemFilter) -> Result<Vec<ItemRecord>> {
        self.item_repo().list(filter).await
    }

    pub async fn get_item(&self, id: i32) -> Result<Option<ItemRecord>> {
        self.item_repo().get(id).await
    }

    pub async fn create_item(
        &self,
        image: &str,
        title: Option<&str>,
        is_slider_item: bool,
    ) -> Result<ItemRecord> {
        self.item_repo().create(image, title, is_slider_item).await
    }

    pub async fn update_item(
        &self,
        id: i32,
        image: &str,
        title: Option<&str>,
        is_slider_item: bool,
    ) -> Result<Option<ItemRecord>> {
        self.item_repo()
            .update(id, image, title, is_slider_item)
            .await
    }

    pub async fn remove_item(&self, id: i32) -> Result<bool> {
        self.item_repo().remove(id).await
    }
}
