use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::api::types::ItemDto;
use crate::db::ItemFilter;
use crate::services::ImageInput;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
}

/// Parsed multipart body of a create/update request.
#[derive(Debug, Default)]
struct ItemForm {
    image: Option<ImageInput>,
    title: Option<String>,
    is_slider_item: Option<bool>,
}

async fn read_form(mut multipart: Multipart) -> Result<ItemForm, ApiError> {
    let mut form = ItemForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation("body", format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                // A file part carries a new payload; a plain text part is
                // the item's existing stored reference sent back verbatim.
                if field.file_name().is_some() {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|_| ApiError::InvalidUpload)?;
                    form.image = Some(ImageInput::Bytes(bytes.to_vec()));
                } else {
                    let text = field.text().await.map_err(|_| ApiError::InvalidUpload)?;
                    form.image = Some(ImageInput::Reference(text));
                }
            }
            "title" => {
                let text = field.text().await.map_err(|e| {
                    ApiError::validation("title", format!("Unreadable title field: {e}"))
                })?;
                if !text.is_empty() {
                    form.title = Some(text);
                }
            }
            "is_slider_item" => {
                let text = field.text().await.map_err(|e| {
                    ApiError::validation("is_slider_item", format!("Unreadable field: {e}"))
                })?;
                form.is_slider_item = Some(parse_bool(&text)?);
            }
            // Laravel-style method override marker and anything else: skip.
            _ => {}
        }
    }

    Ok(form)
}

fn parse_bool(value: &str) -> Result<bool, ApiError> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ApiError::validation(
            "is_slider_item",
            "The is_slider_item field must be true or false.",
        )),
    }
}

/// GET /api/items
/// Public listing, optionally filtered on the slider flag
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ItemDto>>, ApiError> {
    let filter = ItemFilter::parse(query.item_type.as_deref()).ok_or_else(|| {
        ApiError::validation("type", "The type must be one of slider, not_slider, all.")
    })?;

    let items = state.items().list(filter).await?;
    let dtos: Vec<ItemDto> = items.into_iter().map(ItemDto::from).collect();
    Ok(Json(dtos))
}

/// GET /api/items/{id}
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ItemDto>, ApiError> {
    let item = state.items().get(id).await?;
    Ok(Json(ItemDto::from(item)))
}

/// POST /api/items (admin)
/// Multipart: image (required file), title?, is_slider_item (required bool)
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ItemDto>), ApiError> {
    let form = read_form(multipart).await?;

    let is_slider_item = form.is_slider_item.ok_or_else(|| {
        ApiError::validation("is_slider_item", "The is_slider_item field is required.")
    })?;

    let bytes = match form.image {
        None => {
            return Err(ApiError::validation("image", "The image field is required."));
        }
        // Creation needs an actual payload, not a reference.
        Some(ImageInput::Reference(_)) => return Err(ApiError::InvalidUpload),
        Some(ImageInput::Bytes(bytes)) => bytes,
    };

    let item = state
        .items()
        .create(bytes, form.title, is_slider_item)
        .await?;

    Ok((StatusCode::CREATED, Json(ItemDto::from(item))))
}

/// POST or PUT /api/items/{id} (admin)
/// Multipart: image (required; file payload or the current stored
/// reference), title?, is_slider_item?
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<ItemDto>, ApiError> {
    let form = read_form(multipart).await?;

    let image = form
        .image
        .ok_or_else(|| ApiError::validation("image", "The image field is required."))?;

    let item = state
        .items()
        .update(id, image, form.title, form.is_slider_item)
        .await?;

    Ok(Json(ItemDto::from(item)))
}

/// DELETE /api/items/{id} (admin)
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.items().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
