// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, media storage and start HTTP server

use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use where_to_go::config::{self, Config};
use where_to_go::db::{PlaceRepository, PlaceStore};
use where_to_go::handlers::AppServices;
use where_to_go::services::{LocalMediaStorage, MediaStorage};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }
    if config.admin_token.is_empty() {
        log::warn!("ADMIN_TOKEN is empty; admin routes will reject every request");
    }

    log::info!("Starting where-to-go...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool (runs migrations)
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Wire store, media storage and services
    let store: Arc<dyn PlaceStore> = Arc::new(PlaceRepository::new(pool));
    let media: Arc<dyn MediaStorage> = Arc::new(LocalMediaStorage::new(
        config.media_root.clone(),
        config.media_url.clone(),
    ));
    log::info!("Media root: {}", config.media_root.display());

    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let services = match AppServices::new(config, store, media) {
        Ok(services) => services,
        Err(e) => {
            log::error!("Failed to initialize services: {}", e);
            std::process::exit(1);
        }
    };

    // 6. Start HTTP server
    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            .configure(move |cfg| services.configure(cfg))
    })
    .bind(&server_addr)?
    .run()
    .await
}
