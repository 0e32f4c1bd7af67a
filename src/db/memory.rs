// src/db/memory.rs
// DOCUMENTATION: In-memory PlaceStore used by unit tests
// PURPOSE: Same constraints as the SQL schema without a running database

use crate::db::{check_permutation, PlaceStore, UpsertOutcome, UpsertResult};
use crate::errors::PlacesError;
use crate::models::{CreatePlaceRequest, Place, PlaceImage, PlaceSummary, UpdatePlaceRequest};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Same columns the SQL upsert overwrites; id and title stay
fn overwrite_place(place: &mut Place, fields: &CreatePlaceRequest) {
    place.short_description = fields.short_description.clone();
    place.long_description = fields.long_description.clone();
    place.latitude = fields.latitude;
    place.longitude = fields.longitude;
    place.updated_at = Utc::now();
}

fn apply_update(place: &mut Place, req: &UpdatePlaceRequest) {
    if let Some(title) = &req.title {
        place.title = title.clone();
    }
    if let Some(short) = &req.short_description {
        place.short_description = short.clone();
    }
    if let Some(long) = &req.long_description {
        place.long_description = long.clone();
    }
    if let Some(lat) = req.latitude {
        place.latitude = lat;
    }
    if let Some(lng) = req.longitude {
        place.longitude = lng;
    }
    place.updated_at = Utc::now();
}

/// ILIKE over the registered search fields; `needle` is already lowercased
fn matches_search(place: &Place, needle: &str) -> bool {
    [
        &place.title,
        &place.short_description,
        &place.long_description,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

#[derive(Default)]
struct State {
    places: HashMap<Uuid, Place>,
    images: Vec<PlaceImage>,
}

impl State {
    fn title_taken(&self, title: &str, except: Option<Uuid>) -> bool {
        self.places
            .values()
            .any(|p| p.title == title && Some(p.id) != except)
    }

    fn take_images(&mut self, place_id: Uuid) -> Vec<PlaceImage> {
        let (removed, kept): (Vec<PlaceImage>, Vec<PlaceImage>) = std::mem::take(&mut self.images)
            .into_iter()
            .partition(|img| img.place_id == place_id);
        self.images = kept;
        removed
    }

    fn sorted_images(&self, place_id: Uuid) -> Vec<PlaceImage> {
        let mut images: Vec<PlaceImage> = self
            .images
            .iter()
            .filter(|img| img.place_id == place_id)
            .cloned()
            .collect();
        images.sort_by_key(|img| (img.display_order, img.created_at, img.id));
        images
    }
}

#[derive(Default)]
pub struct MemoryPlaceStore {
    state: RwLock<State>,
}

impl MemoryPlaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of image rows across all places
    pub async fn image_count(&self) -> usize {
        self.state.read().await.images.len()
    }
}

#[async_trait]
impl PlaceStore for MemoryPlaceStore {
    async fn list_places(&self) -> Result<Vec<Place>, PlacesError> {
        let state = self.state.read().await;
        let mut places: Vec<Place> = state.places.values().cloned().collect();
        places.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(places)
    }

    async fn get_place(&self, id: Uuid) -> Result<Place, PlacesError> {
        self.state
            .read()
            .await
            .places
            .get(&id)
            .cloned()
            .ok_or_else(|| PlacesError::NotFound(format!("place {}", id)))
    }

    async fn upsert_place(
        &self,
        fields: &CreatePlaceRequest,
        force: bool,
    ) -> Result<UpsertResult, PlacesError> {
        let mut state = self.state.write().await;

        let existing_id = state
            .places
            .values()
            .find(|p| p.title == fields.title)
            .map(|p| p.id);

        let Some(id) = existing_id else {
            let place = Place::new(fields);
            state.places.insert(place.id, place.clone());
            return Ok(UpsertResult {
                place,
                outcome: UpsertOutcome::Created,
                removed_images: Vec::new(),
            });
        };

        if !force {
            let place = state.places[&id].clone();
            return Ok(UpsertResult {
                place,
                outcome: UpsertOutcome::Skipped,
                removed_images: Vec::new(),
            });
        }

        let place = match state.places.get_mut(&id) {
            Some(place) => {
                overwrite_place(place, fields);
                place.clone()
            }
            None => return Err(PlacesError::NotFound(format!("place {}", id))),
        };
        let removed_images = state.take_images(id);

        Ok(UpsertResult {
            place,
            outcome: UpsertOutcome::Updated,
            removed_images,
        })
    }

    async fn create_place(&self, fields: &CreatePlaceRequest) -> Result<Place, PlacesError> {
        let mut state = self.state.write().await;
        if state.title_taken(&fields.title, None) {
            return Err(PlacesError::AlreadyExists(fields.title.clone()));
        }
        let place = Place::new(fields);
        state.places.insert(place.id, place.clone());
        Ok(place)
    }

    async fn update_place(
        &self,
        id: Uuid,
        req: &UpdatePlaceRequest,
    ) -> Result<Place, PlacesError> {
        let mut state = self.state.write().await;
        if let Some(title) = &req.title {
            if state.title_taken(title, Some(id)) {
                return Err(PlacesError::AlreadyExists(title.clone()));
            }
        }
        let place = state
            .places
            .get_mut(&id)
            .ok_or_else(|| PlacesError::NotFound(format!("place {}", id)))?;
        apply_update(place, req);
        Ok(place.clone())
    }

    async fn delete_place(&self, id: Uuid) -> Result<Vec<PlaceImage>, PlacesError> {
        let mut state = self.state.write().await;
        if state.places.remove(&id).is_none() {
            return Err(PlacesError::NotFound(format!("place {}", id)));
        }
        Ok(state.take_images(id))
    }

    async fn search_places(&self, query: Option<&str>) -> Result<Vec<PlaceSummary>, PlacesError> {
        let needle = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let state = self.state.read().await;
        let mut summaries: Vec<PlaceSummary> = state
            .places
            .values()
            .filter(|p| needle.as_deref().map_or(true, |n| matches_search(p, n)))
            .map(|p| PlaceSummary {
                id: p.id,
                title: p.title.clone(),
                latitude: p.latitude,
                longitude: p.longitude,
                images_count: state.images.iter().filter(|i| i.place_id == p.id).count() as i64,
            })
            .collect();
        summaries.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(summaries)
    }

    async fn list_images(&self, place_id: Uuid) -> Result<Vec<PlaceImage>, PlacesError> {
        Ok(self.state.read().await.sorted_images(place_id))
    }

    async fn add_image(
        &self,
        place_id: Uuid,
        file_path: &str,
        display_order: i32,
    ) -> Result<PlaceImage, PlacesError> {
        let mut state = self.state.write().await;
        if !state.places.contains_key(&place_id) {
            return Err(PlacesError::NotFound(format!("place {}", place_id)));
        }
        if state
            .images
            .iter()
            .any(|i| i.place_id == place_id && i.display_order == display_order)
        {
            return Err(PlacesError::AlreadyExists(format!(
                "image order {} for place {}",
                display_order, place_id
            )));
        }
        let image = PlaceImage::new(place_id, file_path.to_string(), display_order);
        state.images.push(image.clone());
        Ok(image)
    }

    async fn next_image_order(&self, place_id: Uuid) -> Result<i32, PlacesError> {
        let state = self.state.read().await;
        Ok(state
            .images
            .iter()
            .filter(|i| i.place_id == place_id)
            .map(|i| i.display_order + 1)
            .max()
            .unwrap_or(0))
    }

    async fn delete_image(&self, image_id: Uuid) -> Result<PlaceImage, PlacesError> {
        let mut state = self.state.write().await;
        let pos = state
            .images
            .iter()
            .position(|i| i.id == image_id)
            .ok_or_else(|| PlacesError::NotFound(format!("image {}", image_id)))?;
        Ok(state.images.remove(pos))
    }

    async fn reorder_images(
        &self,
        place_id: Uuid,
        image_ids: &[Uuid],
    ) -> Result<Vec<PlaceImage>, PlacesError> {
        let mut state = self.state.write().await;
        let current: Vec<Uuid> = state
            .images
            .iter()
            .filter(|i| i.place_id == place_id)
            .map(|i| i.id)
            .collect();
        check_permutation(&current, image_ids)?;

        for image in state.images.iter_mut().filter(|i| i.place_id == place_id) {
            if let Some(pos) = image_ids.iter().position(|id| *id == image.id) {
                image.display_order = pos as i32;
            }
        }
        Ok(state.sorted_images(place_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str) -> CreatePlaceRequest {
        CreatePlaceRequest {
            title: title.to_string(),
            short_description: "short".to_string(),
            long_description: "long".to_string(),
            latitude: 55.75,
            longitude: 37.61,
        }
    }

    #[tokio::test]
    async fn test_delete_place_cascades_to_images() {
        let store = MemoryPlaceStore::new();
        let keep = store.create_place(&fields("Keep")).await.unwrap();
        let gone = store.create_place(&fields("Gone")).await.unwrap();

        store.add_image(keep.id, "places/keep/a.jpg", 0).await.unwrap();
        store.add_image(gone.id, "places/gone/a.jpg", 0).await.unwrap();
        store.add_image(gone.id, "places/gone/b.jpg", 1).await.unwrap();

        let removed = store.delete_place(gone.id).await.unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(store.image_count().await, 1);
        assert!(matches!(
            store.get_place(gone.id).await,
            Err(PlacesError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_place_order_is_unique() {
        let store = MemoryPlaceStore::new();
        let place = store.create_place(&fields("Place")).await.unwrap();

        store.add_image(place.id, "a.jpg", 0).await.unwrap();
        assert!(matches!(
            store.add_image(place.id, "b.jpg", 0).await,
            Err(PlacesError::AlreadyExists(_))
        ));
        assert_eq!(store.next_image_order(place.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_forced_upsert_keeps_identity() {
        let store = MemoryPlaceStore::new();
        let first = store.upsert_place(&fields("Антикафе Bizone"), false).await.unwrap();
        store.add_image(first.place.id, "a.jpg", 0).await.unwrap();

        let mut next = fields("Антикафе Bizone");
        next.short_description = "updated".to_string();
        next.latitude = 10.0;
        let second = store.upsert_place(&next, true).await.unwrap();

        assert_eq!(second.outcome, UpsertOutcome::Updated);
        assert_eq!(second.place.id, first.place.id);
        assert_eq!(second.place.short_description, "updated");
        assert_eq!(second.place.latitude, 10.0);
        assert_eq!(second.removed_images.len(), 1);
        assert_eq!(store.image_count().await, 0);
    }

    #[test]
    fn test_matches_search_is_case_insensitive() {
        let place = Place::new(&fields("Антикафе Bizone"));
        assert!(matches_search(&place, "bizone"));
        assert!(matches_search(&place, "long"));
        assert!(!matches_search(&place, "museum"));
    }

    #[tokio::test]
    async fn test_image_requires_existing_place() {
        let store = MemoryPlaceStore::new();
        assert!(matches!(
            store.add_image(Uuid::new_v4(), "a.jpg", 0).await,
            Err(PlacesError::NotFound(_))
        ));
    }
}
