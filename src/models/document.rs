// src/models/document.rs
// DOCUMENTATION: Place import document
// PURPOSE: Parse, normalize and validate the JSON documents consumed by the importer
//
// Canonical schema:
//   {
//     "title": "...",
//     "description_short": "...",     (legacy key: "short_description")
//     "description_long": "...",      (legacy key: "long_description")
//     "coordinates": {"lat": 55.75, "lng": "37.61"},
//     "imgs": ["https://...", ...]    (optional)
//   }
// Coordinates may be JSON numbers or numeric strings.

use crate::errors::PlacesError;
use crate::models::CreatePlaceRequest;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

/// Required top-level keys with their accepted legacy aliases
const REQUIRED_FIELDS: &[(&str, &[&str])] = &[
    ("title", &[]),
    ("description_short", &["short_description"]),
    ("description_long", &["long_description"]),
    ("coordinates", &[]),
];

/// A coordinate as it appears in documents
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CoordinateValue {
    Number(f64),
    Text(String),
}

impl CoordinateValue {
    /// Degrees as f64; NaN and infinities are rejected
    fn to_degrees(&self, name: &str) -> Result<f64, PlacesError> {
        let degrees = match self {
            CoordinateValue::Number(n) => *n,
            CoordinateValue::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                PlacesError::ValidationError(format!("coordinates.{} is not a number: {:?}", name, s))
            })?,
        };

        if !degrees.is_finite() {
            return Err(PlacesError::ValidationError(format!(
                "coordinates.{} is not a finite number",
                name
            )));
        }
        Ok(degrees)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentCoordinates {
    pub lat: CoordinateValue,
    pub lng: CoordinateValue,
}

/// Normalized import document
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDocument {
    pub title: String,

    #[serde(alias = "short_description")]
    pub description_short: String,

    #[serde(alias = "long_description")]
    pub description_long: String,

    pub coordinates: DocumentCoordinates,

    #[serde(default)]
    pub imgs: Option<Vec<String>>,
}

impl PlaceDocument {
    /// Parse raw bytes: malformed JSON, missing keys and bad types are distinct errors
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PlacesError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| PlacesError::MalformedJson(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, PlacesError> {
        let Value::Object(mut map) = value else {
            return Err(PlacesError::ValidationError(
                "document must be a JSON object".to_string(),
            ));
        };

        normalize_keys(&mut map)?;

        match map.get("coordinates") {
            Some(Value::Object(coords)) => {
                if !coords.contains_key("lat") || !coords.contains_key("lng") {
                    return Err(PlacesError::MissingField(
                        "coordinates (lat, lng)".to_string(),
                    ));
                }
            }
            _ => {
                return Err(PlacesError::ValidationError(
                    "coordinates must be an object with lat and lng".to_string(),
                ))
            }
        }

        serde_json::from_value(Value::Object(map))
            .map_err(|e| PlacesError::ValidationError(e.to_string()))
    }

    /// Image URLs in declared order
    pub fn image_urls(&self) -> &[String] {
        self.imgs.as_deref().unwrap_or(&[])
    }

    /// Convert to validated place fields
    pub fn to_fields(&self) -> Result<CreatePlaceRequest, PlacesError> {
        let fields = CreatePlaceRequest {
            title: self.title.trim().to_string(),
            short_description: self.description_short.clone(),
            long_description: self.description_long.clone(),
            latitude: self.coordinates.lat.to_degrees("lat")?,
            longitude: self.coordinates.lng.to_degrees("lng")?,
        };
        fields.validate()?;
        Ok(fields)
    }
}

/// Check required keys and fold legacy aliases into the canonical names
fn normalize_keys(map: &mut Map<String, Value>) -> Result<(), PlacesError> {
    for (canonical, aliases) in REQUIRED_FIELDS {
        if map.contains_key(*canonical) {
            // canonical wins; drop legacy duplicates so serde does not see both
            for alias in aliases.iter() {
                map.remove(*alias);
            }
            continue;
        }

        let legacy = aliases.iter().find_map(|alias| map.remove(*alias));
        match legacy {
            Some(value) => {
                map.insert(canonical.to_string(), value);
            }
            None => return Err(PlacesError::MissingField(canonical.to_string())),
        }
    }
    Ok(())
}
