use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::items;

/// Listing filter on the slider flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemFilter {
    #[default]
    All,
    Slider,
    NotSlider,
}

impl ItemFilter {
    /// Parse the `type` query parameter. Absent/empty means `All`;
    /// anything else unrecognized is rejected.
    pub fn parse(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("" | "all") => Some(Self::All),
            Some("slider") => Some(Self::Slider),
            Some("not_slider") => Some(Self::NotSlider),
            Some(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub id: i32,
    pub image: String,
    pub title: Option<String>,
    pub is_slider_item: bool,
}

impl From<items::Model> for ItemRecord {
    fn from(model: items::Model) -> Self {
        Self {
            id: model.id,
            image: model.image,
            title: model.title,
            is_slider_item: model.is_slider_item,
        }
    }
}

pub struct ItemRepository {
    conn: DatabaseConnection,
}

impl ItemRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, filter: ItemFilter) -> Result<Vec<ItemRecord>> {
        let mut query = items::Entity::find();

        match filter {
            ItemFilter::All => {}
            ItemFilter::Slider => {
                query = query.filter(items::Column::IsSliderItem.eq(true));
            }
            ItemFilter::NotSlider => {
                query = query.filter(items::Column::IsSliderItem.eq(false));
            }
        }

        let models = query.all(&self.conn).await.context("Failed to list items")?;

        Ok(models.into_iter().map(ItemRecord::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<ItemRecord>> {
        let model = items::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query item")?;

        Ok(model.map(ItemRecord::from))
    }

    pub async fn create(
        &self,
        image: &str,
        title: Option<&str>,
        is_slider_item: bool,
    ) -> Result<ItemRecord> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = items::ActiveModel {
            image: Set(image.to_string()),
            title: Set(title.map(str::to_string)),
            is_slider_item: Set(is_slider_item),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert item")?;

        Ok(ItemRecord::from(model))
    }

    pub async fn update(
        &self,
        id: i32,
        image: &str,
        title: Option<&str>,
        is_slider_item: bool,
    ) -> Result<Option<ItemRecord>> {
        let Some(model) = items::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query item for update")?
        else {
            return Ok(None);
        };

        let mut active: items::ActiveModel = model.into();
        active.image = Set(image.to_string());
        active.title = Set(title.map(str::to_string));
        active.is_slider_item = Set(is_slider_item);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update item")?;

        Ok(Some(ItemRecord::from(updated)))
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = items::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete item")?;

        Ok(result.rows_affected > 0)
    }
}
