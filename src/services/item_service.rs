//! Domain service for the item lifecycle.
//!
//! Orchestrates item create/update/delete, including the file-store side
//! effects that keep each row's `image` reference pointing at a real file.

use thiserror::Error;

use crate::db::{ItemFilter, ItemRecord};

/// Errors specific to item operations.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Item {0} not found")]
    NotFound(i32),

    #[error("Invalid image upload.")]
    InvalidUpload,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ItemError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ItemError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Image field of an update request: either the item's current stored
/// reference sent back verbatim (keep the file), or a new raw payload.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Reference(String),
    Bytes(Vec<u8>),
}

/// Domain service trait for items.
#[async_trait::async_trait]
pub trait ItemService: Send + Sync {
    async fn list(&self, filter: ItemFilter) -> Result<Vec<ItemRecord>, ItemError>;

    async fn get(&self, id: i32) -> Result<ItemRecord, ItemError>;

    /// Stores the image first, then inserts the row. No row is written for
    /// an invalid payload; a failed insert removes the just-stored file.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::InvalidUpload`] when the payload is empty or
    /// not a recognized image, or when storage fails.
    async fn create(
        &self,
        image: Vec<u8>,
        title: Option<String>,
        is_slider_item: bool,
    ) -> Result<ItemRecord, ItemError>;

    /// Replaces the item's fields. For [`ImageInput::Reference`] matching
    /// the stored value the file store is not touched at all; for
    /// [`ImageInput::Bytes`] the old file is deleted and the new payload
    /// stored before the row is updated. Anything else fails with
    /// [`ItemError::InvalidUpload`] leaving item and file untouched.
    ///
    /// `title` overwrites unconditionally (absent clears it);
    /// `is_slider_item` keeps the stored value when absent.
    async fn update(
        &self,
        id: i32,
        image: ImageInput,
        title: Option<String>,
        is_slider_item: Option<bool>,
    ) -> Result<ItemRecord, ItemError>;

    /// Deletes the backing file (tolerating already-absent), then the row.
    /// File removal goes first so a failure there leaves the row intact
    /// for retry; the reverse failure leaves a dangling row, accepted as a
    /// narrow window.
    async fn delete(&self, id: i32) -> Result<(), ItemError>;
}
