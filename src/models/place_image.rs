// src/models/place_image.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One ordered photo of a place
/// DOCUMENTATION: `file_path` is the media storage key; the public URL is derived from it
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlaceImage {
    pub id: Uuid,
    pub place_id: Uuid,
    pub file_path: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Image DTO for admin responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceImageResponse {
    pub id: Uuid,
    pub order: i32,
    pub url: String,
}

/// Body of PUT /admin/places/{id}/images/order
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderImagesRequest {
    /// Every image id of the place, in the desired order
    pub image_ids: Vec<Uuid>,
}

impl PlaceImage {
    pub fn new(place_id: Uuid, file_path: String, display_order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            place_id,
            file_path,
            display_order,
            created_at: Utc::now(),
        }
    }

    pub fn to_response(&self, url: String) -> PlaceImageResponse {
        PlaceImageResponse {
            id: self.id,
            order: self.display_order,
            url,
        }
    }
}
