pub mod file_store;
pub use file_store::FileStore;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, PublicUser};
pub use auth_service_impl::SeaOrmAuthService;

pub mod item_service;
pub mod item_service_impl;
pub use item_service::{ImageInput, ItemError, ItemService};
pub use item_service_impl::SeaOrmItemService;
