// src/models/place.rs
// DOCUMENTATION: Core data structures for places
// PURPOSE: Database row, admin request DTOs and public response shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents a complete place record from the database
/// DOCUMENTATION: Maps directly to the places table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    /// Unique identifier (UUID v4)
    pub id: Uuid,

    /// Human-facing name, unique across places
    pub title: String,

    /// Teaser shown in the map side panel
    pub short_description: String,

    /// Full description (HTML allowed)
    pub long_description: String,

    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,

    /// Longitude in degrees, [-180, 180]
    pub longitude: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a place
/// DOCUMENTATION: Used for admin creates and as the normalized import payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreatePlaceRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    pub short_description: String,

    #[serde(default)]
    pub long_description: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Request DTO for updating an existing place
/// DOCUMENTATION: All fields are optional - only provided fields are updated
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlaceRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    pub short_description: Option<String>,

    pub long_description: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

/// Admin list row with gallery size
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlaceSummary {
    pub id: Uuid,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub images_count: i64,
}

/// Query string for GET /admin/places
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against the registered search fields
    pub q: Option<String>,
}

/// Coordinates as rendered in the place detail payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailCoordinates {
    pub lng: String,
    pub lat: String,
}

/// Response DTO for GET /places/{id}/
/// DOCUMENTATION: Shape consumed by the map front-end side panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDetailResponse {
    pub title: String,
    pub imgs: Vec<String>,
    pub description_short: String,
    pub description_long: String,
    pub coordinates: DetailCoordinates,
}

impl Place {
    /// Build a fresh record from validated fields
    pub fn new(fields: &CreatePlaceRequest) -> Self {
        let now = Utc::now();
        Place {
            id: Uuid::new_v4(),
            title: fields.title.clone(),
            short_description: fields.short_description.clone(),
            long_description: fields.long_description.clone(),
            latitude: fields.latitude,
            longitude: fields.longitude,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> CreatePlaceRequest {
        CreatePlaceRequest {
            title: "Антикафе Bizone".to_string(),
            short_description: "short".to_string(),
            long_description: "long".to_string(),
            latitude: 55.753676,
            longitude: 37.64,
        }
    }

    #[test]
    fn test_create_request_validation() {
        assert!(fields().validate().is_ok());

        let mut bad = fields();
        bad.latitude = 91.0;
        assert!(bad.validate().is_err());

        let mut bad = fields();
        bad.longitude = -180.5;
        assert!(bad.validate().is_err());

        let mut bad = fields();
        bad.title = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_request_validation() {
        let req = UpdatePlaceRequest {
            latitude: Some(-95.0),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        assert!(UpdatePlaceRequest::default().validate().is_ok());
    }
}
