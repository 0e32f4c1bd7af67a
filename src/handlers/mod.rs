// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export route configs and wire shared services into actix app data

pub mod admin;
pub mod health;
pub mod map;
pub mod media;
pub mod places;

pub use admin::config as admin_config;
pub use health::config as health_config;
pub use map::config as map_config;
pub use media::config as media_config;
pub use places::config as places_config;

use crate::config::Config;
use crate::db::PlaceStore;
use crate::errors::PlacesError;
use crate::services::{ImportService, MediaStorage, PlaceService, QueryService};
use actix_web::web;
use std::sync::Arc;
use std::time::Duration;

/// Services shared by all workers
/// DOCUMENTATION: Built once in main; cloning only bumps reference counts
#[derive(Clone)]
pub struct AppServices {
    pub config: web::Data<Config>,
    pub query: web::Data<QueryService>,
    pub places: web::Data<PlaceService>,
    pub importer: web::Data<ImportService>,
    pub media: web::Data<Arc<dyn MediaStorage>>,
}

impl AppServices {
    pub fn new(
        config: Config,
        store: Arc<dyn PlaceStore>,
        media: Arc<dyn MediaStorage>,
    ) -> Result<Self, PlacesError> {
        let importer = ImportService::new(
            store.clone(),
            media.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
        )?;

        Ok(Self {
            config: web::Data::new(config),
            query: web::Data::new(QueryService::new(store.clone(), media.clone())),
            places: web::Data::new(PlaceService::new(store, media.clone())),
            importer: web::Data::new(importer),
            media: web::Data::new(media),
        })
    }

    /// Register app data and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.query.clone())
            .app_data(self.places.clone())
            .app_data(self.importer.clone())
            .app_data(self.media.clone());

        health_config(cfg);
        map_config(cfg);
        places_config(cfg);
        media_config(cfg);
        admin_config(cfg);
    }
}
