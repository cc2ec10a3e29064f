//! `SeaORM` + filesystem implementation of the `ItemService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{ItemFilter, ItemRecord, Store};
use crate::services::file_store::{FileStore, sniff_image_ext};
use crate::services::item_service::{ImageInput, ItemError, ItemService};

/// Category under the uploads root for item images.
const ITEM_CATEGORY: &str = "items";

pub struct SeaOrmItemService {
    store: Store,
    files: Arc<FileStore>,
}

impl SeaOrmItemService {
    #[must_use]
    pub const fn new(store: Store, files: Arc<FileStore>) -> Self {
        Self { store, files }
    }

    async fn save_image(&self, bytes: &[u8]) -> Result<String, ItemError> {
        if bytes.is_empty() || sniff_image_ext(bytes).is_none() {
            return Err(ItemError::InvalidUpload);
        }

        self.files
            .save(bytes, ITEM_CATEGORY)
            .await
            .map_err(|e| {
                warn!("Failed to store upload: {e}");
                ItemError::InvalidUpload
            })
    }
}

#[async_trait]
impl ItemService for SeaOrmItemService {
    async fn list(&self, filter: ItemFilter) -> Result<Vec<ItemRecord>, ItemError> {
        Ok(self.store.list_items(filter).await?)
    }

    async fn get(&self, id: i32) -> Result<ItemRecord, ItemError> {
        self.store
            .get_item(id)
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    async fn create(
        &self,
        image: Vec<u8>,
        title: Option<String>,
        is_slider_item: bool,
    ) -> Result<ItemRecord, ItemError> {
        let reference = self.save_image(&image).await?;

        match self
            .store
            .create_item(&reference, title.as_deref(), is_slider_item)
            .await
        {
            Ok(item) => {
                info!(item_id = item.id, image = %item.image, "Created item");
                Ok(item)
            }
            Err(e) => {
                // Roll back the file write so no orphan is left behind.
                if let Err(cleanup) = self.files.delete(&reference).await {
                    warn!("Failed to clean up stored file {reference}: {cleanup}");
                }
                Err(e.into())
            }
        }
    }

    async fn update(
        &self,
        id: i32,
        image: ImageInput,
        title: Option<String>,
        is_slider_item: Option<bool>,
    ) -> Result<ItemRecord, ItemError> {
        let current = self
            .store
            .get_item(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        let is_slider_item = is_slider_item.unwrap_or(current.is_slider_item);

        let reference = match image {
            // No-op replace: same reference, keep the existing file.
            ImageInput::Reference(r) if r == current.image => r,
            ImageInput::Reference(_) => return Err(ItemError::InvalidUpload),
            ImageInput::Bytes(bytes) => {
                if bytes.is_empty() || sniff_image_ext(&bytes).is_none() {
                    return Err(ItemError::InvalidUpload);
                }
                self.files.delete(&current.image).await?;
                self.save_image(&bytes).await?
            }
        };

        let updated = self
            .store
            .update_item(id, &reference, title.as_deref(), is_slider_item)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        info!(item_id = id, image = %updated.image, "Updated item");

        Ok(updated)
    }

    async fn delete(&self, id: i32) -> Result<(), ItemError> {
        let item = self
            .store
            .get_item(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        // File first: if this fails the row survives and the call can be
        // retried without orphaning the reference.
        self.files.delete(&item.image).await?;

        if !self.store.remove_item(id).await? {
            return Err(ItemError::NotFound(id));
        }

        info!(item_id = id, "Deleted item");

        Ok(())
    }
}
