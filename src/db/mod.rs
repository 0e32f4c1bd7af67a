// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Storage trait shared by the importer, query layer and admin API

#[cfg(test)]
pub mod memory;
pub mod repository;

#[cfg(test)]
pub use memory::MemoryPlaceStore;
pub use repository::PlaceRepository;

use crate::errors::PlacesError;
use crate::models::{CreatePlaceRequest, Place, PlaceImage, PlaceSummary, UpdatePlaceRequest};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

/// What an import-style upsert did to the place record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
    Skipped,
}

/// Result of `PlaceStore::upsert_place`
#[derive(Debug, Clone)]
pub struct UpsertResult {
    pub place: Place,
    pub outcome: UpsertOutcome,
    /// Image rows deleted by a forced overwrite; their blobs are still on disk
    pub removed_images: Vec<PlaceImage>,
}

/// Persistence for places and their galleries
/// DOCUMENTATION: Every method is atomic on its own; `upsert_place` and
/// `delete_place` run their lookups and writes in one transaction
#[async_trait]
pub trait PlaceStore: Send + Sync {
    /// All places, ordered by title
    async fn list_places(&self) -> Result<Vec<Place>, PlacesError>;

    async fn get_place(&self, id: Uuid) -> Result<Place, PlacesError>;

    /// Create-or-get by title; with `force` an existing place is overwritten
    /// and its images are cleared
    async fn upsert_place(
        &self,
        fields: &CreatePlaceRequest,
        force: bool,
    ) -> Result<UpsertResult, PlacesError>;

    /// Admin create; a duplicate title is `AlreadyExists`
    async fn create_place(&self, fields: &CreatePlaceRequest) -> Result<Place, PlacesError>;

    async fn update_place(
        &self,
        id: Uuid,
        req: &UpdatePlaceRequest,
    ) -> Result<Place, PlacesError>;

    /// Delete a place and all of its images; returns the deleted images
    async fn delete_place(&self, id: Uuid) -> Result<Vec<PlaceImage>, PlacesError>;

    /// Admin listing with image counts, filtered over the registered search fields
    async fn search_places(&self, query: Option<&str>) -> Result<Vec<PlaceSummary>, PlacesError>;

    /// Images of one place in default order
    async fn list_images(&self, place_id: Uuid) -> Result<Vec<PlaceImage>, PlacesError>;

    async fn add_image(
        &self,
        place_id: Uuid,
        file_path: &str,
        display_order: i32,
    ) -> Result<PlaceImage, PlacesError>;

    /// One past the highest order in use, 0 for an empty gallery
    async fn next_image_order(&self, place_id: Uuid) -> Result<i32, PlacesError>;

    async fn delete_image(&self, image_id: Uuid) -> Result<PlaceImage, PlacesError>;

    /// Assign orders 0..n following `image_ids`, which must be a permutation
    /// of the place's current images
    async fn reorder_images(
        &self,
        place_id: Uuid,
        image_ids: &[Uuid],
    ) -> Result<Vec<PlaceImage>, PlacesError>;
}

/// Reject reorder requests that are not an exact permutation of `current`
pub fn check_permutation(current: &[Uuid], requested: &[Uuid]) -> Result<(), PlacesError> {
    let current_set: HashSet<&Uuid> = current.iter().collect();
    let requested_set: HashSet<&Uuid> = requested.iter().collect();

    if requested_set.len() != requested.len() {
        return Err(PlacesError::InvalidInput(
            "image_ids contains duplicates".to_string(),
        ));
    }

    if current_set != requested_set {
        return Err(PlacesError::InvalidInput(format!(
            "image_ids must list exactly the {} images of the place",
            current.len()
        )));
    }

    Ok(())
}
