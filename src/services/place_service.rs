// src/services/place_service.rs
// DOCUMENTATION: Business logic for admin place management
// PURPOSE: Intermediary between admin handlers, the store and media storage

use crate::db::PlaceStore;
use crate::errors::PlacesError;
use crate::models::{
    CreatePlaceRequest, Place, PlaceImage, PlaceImageResponse, PlaceSummary, UpdatePlaceRequest,
};
use crate::services::media_storage::MediaStorage;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct PlaceService {
    store: Arc<dyn PlaceStore>,
    media: Arc<dyn MediaStorage>,
}

impl PlaceService {
    pub fn new(store: Arc<dyn PlaceStore>, media: Arc<dyn MediaStorage>) -> Self {
        Self { store, media }
    }

    pub async fn search_places(&self, query: Option<&str>) -> Result<Vec<PlaceSummary>, PlacesError> {
        self.store.search_places(query).await
    }

    pub async fn create_place(&self, req: CreatePlaceRequest) -> Result<Place, PlacesError> {
        req.validate()?;
        self.store.create_place(&req).await
    }

    pub async fn update_place(
        &self,
        id: Uuid,
        req: UpdatePlaceRequest,
    ) -> Result<Place, PlacesError> {
        req.validate()?;
        self.store.update_place(id, &req).await
    }

    /// Delete a place, its image rows and their blobs
    pub async fn delete_place(&self, id: Uuid) -> Result<(), PlacesError> {
        let removed = self.store.delete_place(id).await?;
        for image in &removed {
            if let Err(e) = self.media.delete(&image.file_path).await {
                log::warn!("Failed to remove blob {}: {}", image.file_path, e);
            }
        }
        Ok(())
    }

    pub async fn list_images(&self, place_id: Uuid) -> Result<Vec<PlaceImageResponse>, PlacesError> {
        self.store.get_place(place_id).await?;
        let images = self.store.list_images(place_id).await?;
        Ok(self.to_responses(&images))
    }

    /// Store an uploaded image at the end of the gallery
    pub async fn upload_image(
        &self,
        place_id: Uuid,
        filename: &str,
        content: &[u8],
    ) -> Result<PlaceImageResponse, PlacesError> {
        if content.is_empty() {
            return Err(PlacesError::InvalidInput("image body is empty".to_string()));
        }

        self.store.get_place(place_id).await?;
        let order = self.store.next_image_order(place_id).await?;
        let key = self.media.save(place_id, filename, content).await?;

        match self.store.add_image(place_id, &key, order).await {
            Ok(image) => {
                log::info!("Uploaded image {} for place {}", key, place_id);
                Ok(image.to_response(self.media.url(&image.file_path)))
            }
            Err(e) => {
                if let Err(cleanup) = self.media.delete(&key).await {
                    log::warn!("Failed to remove orphaned blob {}: {}", key, cleanup);
                }
                Err(e)
            }
        }
    }

    pub async fn delete_image(&self, image_id: Uuid) -> Result<(), PlacesError> {
        let image = self.store.delete_image(image_id).await?;
        self.media.delete(&image.file_path).await
    }

    pub async fn reorder_images(
        &self,
        place_id: Uuid,
        image_ids: &[Uuid],
    ) -> Result<Vec<PlaceImageResponse>, PlacesError> {
        self.store.get_place(place_id).await?;
        let images = self.store.reorder_images(place_id, image_ids).await?;
        Ok(self.to_responses(&images))
    }

    fn to_responses(&self, images: &[PlaceImage]) -> Vec<PlaceImageResponse> {
        images
            .iter()
            .map(|image| image.to_response(self.media.url(&image.file_path)))
            .collect()
    }
}
