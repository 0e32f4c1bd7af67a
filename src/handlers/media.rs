// src/handlers/media.rs
// DOCUMENTATION: Serves stored image blobs
// PURPOSE: Local media storage is reachable under /media

use crate::errors::PlacesError;
use crate::services::{content_type_for_path, MediaStorage};
use actix_web::{http::header, web, HttpResponse, Responder};
use std::sync::Arc;

/// GET /media/{key}
pub async fn get_media(
    media: web::Data<Arc<dyn MediaStorage>>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let key = path.into_inner();
    let bytes = media.read(&key).await?;

    Ok(HttpResponse::Ok()
        .content_type(content_type_for_path(&key))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/media/{key:.*}", web::get().to(get_media));
}
