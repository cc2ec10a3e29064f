use serde::Serialize;

use crate::db::ItemRecord;
use crate::services::PublicUser;

/// Wire shape of an item: `{id, image, title, is_slider_item}`.
#[derive(Debug, Serialize)]
pub struct ItemDto {
    pub id: i32,
    pub image: String,
    pub title: Option<String>,
    pub is_slider_item: bool,
}

impl From<ItemRecord> for ItemDto {
    fn from(item: ItemRecord) -> Self {
        Self {
            id: item.id,
            image: item.image,
            title: item.title,
            is_slider_item: item.is_slider_item,
        }
    }
}

/// Wire shape of a user in the login response: `{id, email, role}`.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub role: String,
}

impl From<PublicUser> for UserDto {
    fn from(user: PublicUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserDto,
    pub token: String,
}
