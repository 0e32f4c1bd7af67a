// src/services/query_service.rs
// DOCUMENTATION: Read-side serialization for the public map
// PURPOSE: Render places as a GeoJSON feature collection and as detail payloads

use crate::db::PlaceStore;
use crate::errors::PlacesError;
use crate::models::{DetailCoordinates, Place, PlaceDetailResponse};
use crate::services::media_storage::{decode_url, MediaStorage};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Path of the detail endpoint for a place
pub fn details_url(id: Uuid) -> String {
    format!("/places/{}/", id)
}

/// One map marker; GeoJSON positions are [longitude, latitude]
pub fn place_feature(place: &Place) -> Feature {
    let point = geo_types::Point::new(place.longitude, place.latitude);

    let mut properties = JsonObject::new();
    properties.insert("title".to_string(), json!(place.title));
    properties.insert("placeId".to_string(), json!(place.id.to_string()));
    properties.insert("detailsUrl".to_string(), json!(details_url(place.id)));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&point))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub struct QueryService {
    store: Arc<dyn PlaceStore>,
    media: Arc<dyn MediaStorage>,
}

impl QueryService {
    pub fn new(store: Arc<dyn PlaceStore>, media: Arc<dyn MediaStorage>) -> Self {
        Self { store, media }
    }

    /// All places as map features
    pub async fn feature_collection(&self) -> Result<FeatureCollection, PlacesError> {
        let places = self.store.list_places().await?;
        Ok(FeatureCollection {
            bbox: None,
            features: places.iter().map(place_feature).collect(),
            foreign_members: None,
        })
    }

    /// Detail payload; image URLs follow gallery order and are percent-decoded
    pub async fn place_detail(&self, id: Uuid) -> Result<PlaceDetailResponse, PlacesError> {
        let place = self.store.get_place(id).await?;
        let images = self.store.list_images(id).await?;

        Ok(PlaceDetailResponse {
            title: place.title,
            imgs: images
                .iter()
                .map(|image| decode_url(&self.media.url(&image.file_path)))
                .collect(),
            description_short: place.short_description,
            description_long: place.long_description,
            coordinates: DetailCoordinates {
                lng: place.longitude.to_string(),
                lat: place.latitude.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryPlaceStore;
    use crate::models::CreatePlaceRequest;
    use crate::services::media_storage::LocalMediaStorage;

    fn fields(title: &str, lat: f64, lng: f64) -> CreatePlaceRequest {
        CreatePlaceRequest {
            title: title.to_string(),
            short_description: "short".to_string(),
            long_description: "long".to_string(),
            latitude: lat,
            longitude: lng,
        }
    }

    fn service(store: Arc<MemoryPlaceStore>) -> QueryService {
        QueryService::new(store, Arc::new(LocalMediaStorage::new("/tmp/media", "/media")))
    }

    #[test]
    fn test_feature_puts_longitude_first() {
        let place = Place::new(&fields("Red Square", 55.75, 37.61));
        let feature = serde_json::to_value(place_feature(&place)).unwrap();

        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"], json!([37.61, 55.75]));
        assert_eq!(feature["properties"]["title"], "Red Square");
        assert_eq!(feature["properties"]["placeId"], place.id.to_string());
        assert_eq!(
            feature["properties"]["detailsUrl"],
            format!("/places/{}/", place.id)
        );
    }

    #[tokio::test]
    async fn test_feature_collection_lists_every_place() {
        let store = Arc::new(MemoryPlaceStore::new());
        store.create_place(&fields("B", 1.0, 2.0)).await.unwrap();
        store.create_place(&fields("A", 3.0, 4.0)).await.unwrap();

        let collection = service(store).feature_collection().await.unwrap();
        let value = serde_json::to_value(&collection).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 2);
        assert_eq!(value["features"][0]["properties"]["title"], "A");
    }

    #[tokio::test]
    async fn test_detail_orders_and_decodes_images() {
        let store = Arc::new(MemoryPlaceStore::new());
        let place = store
            .create_place(&fields("Крыши24", 55.77566, 37.64912))
            .await
            .unwrap();
        store
            .add_image(place.id, &format!("places/{}/second photo.jpg", place.id), 1)
            .await
            .unwrap();
        store
            .add_image(place.id, &format!("places/{}/первое.jpg", place.id), 0)
            .await
            .unwrap();

        let detail = service(store).place_detail(place.id).await.unwrap();

        assert_eq!(detail.title, "Крыши24");
        assert_eq!(
            detail.imgs,
            vec![
                format!("/media/places/{}/первое.jpg", place.id),
                format!("/media/places/{}/second photo.jpg", place.id),
            ]
        );
        assert_eq!(detail.coordinates.lat, "55.77566");
        assert_eq!(detail.coordinates.lng, "37.64912");
    }

    #[tokio::test]
    async fn test_detail_for_unknown_place() {
        let store = Arc::new(MemoryPlaceStore::new());
        assert!(matches!(
            service(store).place_detail(Uuid::new_v4()).await,
            Err(PlacesError::NotFound(_))
        ));
    }
}
