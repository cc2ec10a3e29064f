use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, FileStore, ItemService, SeaOrmAuthService, SeaOrmItemService,
};

pub mod auth;
mod error;
mod items;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub item_service: Arc<dyn ItemService>,

    pub file_store: Arc<FileStore>,
}

impl AppState {
    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.auth_service
    }

    #[must_use]
    pub fn items(&self) -> &Arc<dyn ItemService> {
        &self.item_service
    }

    #[must_use]
    pub fn files(&self) -> &Arc<FileStore> {
        &self.file_store
    }
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let file_store = Arc::new(FileStore::new(config.general.uploads_path.clone()));

    let auth_service = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.security.token_ttl_hours,
    ));

    let item_service = Arc::new(SeaOrmItemService::new(store.clone(), file_store.clone()));

    Ok(Arc::new(AppState {
        config: Arc::new(RwLock::new(config)),
        store,
        auth_service,
        item_service,
        file_store,
    }))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (uploads_path, cors_origins, max_upload_bytes) = {
        let config = state.config.read().await;
        (
            config.general.uploads_path.clone(),
            config.server.cors_allowed_origins.clone(),
            config.server.max_upload_bytes,
        )
    };

    // Item listing and detail retrieval are public; mutation is admin-only.
    let public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/items", get(items::list_items))
        .route("/items/{id}", get(items::get_item));

    let authed_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/items", post(items::create_item))
        // The original surface exposes update as POST with a _method=PUT
        // override; both verbs are accepted here.
        .route("/items/{id}", post(items::update_item))
        .route("/items/{id}", put(items::update_item))
        .route("/items/{id}", delete(items::delete_item))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_middleware,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .merge(admin_routes)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/uploads", tower_http::services::ServeDir::new(uploads_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
