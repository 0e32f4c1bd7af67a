// src/handlers/map.rs
// DOCUMENTATION: Public map page and GeoJSON feed
// PURPOSE: Serve every place as a map marker

use crate::errors::PlacesError;
use crate::services::QueryService;
use actix_web::{http::header::ContentType, web, HttpResponse, Responder};

const GEOJSON_PLACEHOLDER: &str = "{{PLACES_GEOJSON}}";

const MAP_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Куда пойти</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <style>
    html, body { height: 100%; margin: 0; }
    #map { position: absolute; inset: 0 0 0 0; }
    #details { position: absolute; top: 0; left: 0; bottom: 0; width: 360px; overflow-y: auto;
               background: #fff; z-index: 1000; padding: 16px; display: none; }
    #details img { width: 100%; margin-bottom: 8px; }
  </style>
</head>
<body>
  <div id="map"></div>
  <div id="details"></div>
  <script type="application/json" id="places-geojson">{{PLACES_GEOJSON}}</script>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script>
    const places = JSON.parse(document.getElementById("places-geojson").textContent);
    const map = L.map("map").setView([55.751244, 37.618423], 12);
    L.tileLayer("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", {
      attribution: "&copy; OpenStreetMap contributors"
    }).addTo(map);

    const panel = document.getElementById("details");
    function showPlace(url) {
      fetch(url).then(r => r.json()).then(place => {
        panel.replaceChildren();
        const title = document.createElement("h2");
        title.textContent = place.title;
        panel.append(title);
        for (const src of place.imgs) {
          const img = document.createElement("img");
          img.src = src;
          panel.append(img);
        }
        const short = document.createElement("p");
        short.textContent = place.description_short;
        const long = document.createElement("div");
        long.innerHTML = place.description_long;
        panel.append(short, long);
        panel.style.display = "block";
      });
    }

    L.geoJSON(places, {
      onEachFeature: (feature, layer) => {
        layer.bindTooltip(feature.properties.title);
        layer.on("click", () => showPlace(feature.properties.detailsUrl));
      }
    }).addTo(map);
  </script>
</body>
</html>
"#;

/// Embed JSON inside a <script> element; `</` would close it early
pub fn embed_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// GET /
pub async fn map_page(query: web::Data<QueryService>) -> Result<impl Responder, PlacesError> {
    let collection = query.feature_collection().await?;
    let json = serde_json::to_string(&collection)
        .map_err(|e| PlacesError::InvalidInput(format!("GeoJSON serialization failed: {}", e)))?;

    let page = MAP_PAGE.replace(GEOJSON_PLACEHOLDER, &embed_json(&json));
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page))
}

/// GET /places.geojson
pub async fn places_geojson(
    query: web::Data<QueryService>,
) -> Result<impl Responder, PlacesError> {
    let collection = query.feature_collection().await?;
    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .json(collection))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(map_page))
        .route("/places.geojson", web::get().to(places_geojson));
}
