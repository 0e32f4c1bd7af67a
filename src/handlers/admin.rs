// src/handlers/admin.rs
// DOCUMENTATION: Admin handlers for place, gallery and import management
// PURPOSE: Expose content management over REST behind the admin token

use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::{registrations, CreatePlaceRequest, ReorderImagesRequest, SearchQuery, UpdatePlaceRequest};
use crate::services::{ImportService, PlaceService};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Largest accepted image upload body
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Request body for single-document import
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// Local path or http(s) URL of a place document
    pub source: String,
    #[serde(default)]
    pub force: bool,
}

/// Request body for directory import
#[derive(Debug, Deserialize)]
pub struct BatchImportRequest {
    /// Server-side directory holding *.json place documents
    pub directory: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// GET /admin/registry
/// Which fields the admin lists, searches, filters and orders by
pub async fn get_registry(
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;
    Ok(HttpResponse::Ok().json(registrations()))
}

/// GET /admin/places?q=
pub async fn list_places(
    places: web::Data<PlaceService>,
    config: web::Data<Config>,
    req: HttpRequest,
    query: web::Query<SearchQuery>,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    let summaries = places.search_places(query.q.as_deref()).await?;
    Ok(HttpResponse::Ok().json(summaries))
}

/// POST /admin/places
pub async fn create_place(
    places: web::Data<PlaceService>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: web::Json<CreatePlaceRequest>,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    let place = places.create_place(body.into_inner()).await?;
    log::info!("Admin created place \"{}\" ({})", place.title, place.id);
    Ok(HttpResponse::Created().json(place))
}

/// PUT /admin/places/{id}
pub async fn update_place(
    places: web::Data<PlaceService>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePlaceRequest>,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    let place = places
        .update_place(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(place))
}

/// DELETE /admin/places/{id}
///
/// DOCUMENTATION: Image rows go with the place; blobs are removed afterwards
pub async fn delete_place(
    places: web::Data<PlaceService>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    let id = path.into_inner();
    places.delete_place(id).await?;
    log::info!("Admin deleted place {}", id);
    Ok(HttpResponse::NoContent().finish())
}

/// GET /admin/places/{id}/images
pub async fn list_images(
    places: web::Data<PlaceService>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    let images = places.list_images(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(images))
}

/// POST /admin/places/{id}/images?filename=
/// Raw image bytes in the body, appended after the last image
pub async fn upload_image(
    places: web::Data<PlaceService>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    let filename = query.filename.as_deref().unwrap_or("image.jpg");
    let image = places
        .upload_image(path.into_inner(), filename, &body)
        .await?;
    Ok(HttpResponse::Created().json(image))
}

/// PUT /admin/places/{id}/images/order
pub async fn reorder_images(
    places: web::Data<PlaceService>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<ReorderImagesRequest>,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    let images = places
        .reorder_images(path.into_inner(), &body.image_ids)
        .await?;
    Ok(HttpResponse::Ok().json(images))
}

/// DELETE /admin/images/{id}
pub async fn delete_image(
    places: web::Data<PlaceService>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    places.delete_image(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /admin/import
/// Import one place document from a path or URL
pub async fn import_place(
    importer: web::Data<ImportService>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: web::Json<ImportRequest>,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    log::info!("Admin import requested from {}", body.source);
    let report = importer.import_place(&body.source, body.force).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// POST /admin/import/batch
///
/// DOCUMENTATION: Imports every *.json file in a server-side directory
/// Per-file failures are reported in the summary, not as an HTTP error
pub async fn import_batch(
    importer: web::Data<ImportService>,
    config: web::Data<Config>,
    req: HttpRequest,
    body: web::Json<BatchImportRequest>,
) -> Result<impl Responder, PlacesError> {
    verify_admin_token(&req, &config)?;

    let dir = PathBuf::from(&body.directory);
    let report = importer.import_directory(&dir, body.force).await?;

    log::info!(
        "Batch import completed: {}/{} files succeeded, {} images saved",
        report.succeeded,
        report.total_files,
        report.images_saved
    );

    Ok(HttpResponse::Ok().json(report))
}

/// Helper function to verify admin authentication
/// DOCUMENTATION: Checks X-Admin-Token header against configured admin token
fn verify_admin_token(req: &HttpRequest, config: &Config) -> Result<(), PlacesError> {
    let token = req
        .headers()
        .get("X-Admin-Token")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            log::warn!("Admin request without token");
            PlacesError::Unauthorized
        })?;

    if config.admin_token.is_empty() || token != config.admin_token {
        log::warn!("Admin request with invalid token");
        return Err(PlacesError::Unauthorized);
    }

    Ok(())
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .route("/registry", web::get().to(get_registry))
            .route("/places", web::get().to(list_places))
            .route("/places", web::post().to(create_place))
            .route("/places/{id}", web::put().to(update_place))
            .route("/places/{id}", web::delete().to(delete_place))
            .route("/places/{id}/images", web::get().to(list_images))
            .route("/places/{id}/images", web::post().to(upload_image))
            .route("/places/{id}/images/order", web::put().to(reorder_images))
            .route("/images/{id}", web::delete().to(delete_image))
            .route("/import", web::post().to(import_place))
            .route("/import/batch", web::post().to(import_batch)),
    );
}
