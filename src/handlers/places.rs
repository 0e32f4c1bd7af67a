// src/handlers/places.rs
// DOCUMENTATION: HTTP handler for the public place detail endpoint
// PURPOSE: Parse the place id, call the query service, return JSON

use crate::errors::PlacesError;
use crate::services::QueryService;
use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

/// GET /places/{id}/
/// Place detail for the map side panel; unknown or malformed ids are 404
pub async fn get_place_details(
    query: web::Data<QueryService>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let raw_id = path.into_inner();
    let id = Uuid::parse_str(&raw_id)
        .map_err(|_| PlacesError::NotFound(format!("place {}", raw_id)))?;

    let detail = query.place_detail(id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/places")
            .route("/{id}/", web::get().to(get_place_details))
            .route("/{id}", web::get().to(get_place_details)),
    );
}
