// src/bin/load_places.rs
// DOCUMENTATION: Command-line importer for place documents
// PURPOSE: Load one document (path or URL) or a whole directory into the database

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use where_to_go::config::{self, Config};
use where_to_go::db::{PlaceRepository, PlaceStore, UpsertOutcome};
use where_to_go::services::{BatchReport, ImportReport, ImportService, LocalMediaStorage, MediaStorage};

// --- ANSI colors ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

#[derive(Parser, Debug)]
#[command(name = "load_places", version, about = "Import places from JSON documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import one place from a local JSON file or an http(s) URL
    Place {
        source: String,
        /// Overwrite an existing place with the same title and replace its images
        #[arg(long)]
        force: bool,
    },
    /// Import every *.json file in a directory
    All {
        directory: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env();
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,sqlx=warn");
    }
    env_logger::init();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("configuration error: {}", e))?;

    let pool = config::init_db_pool(&config)
        .await
        .context("failed to connect to database")?;
    let store: Arc<dyn PlaceStore> = Arc::new(PlaceRepository::new(pool));
    let media: Arc<dyn MediaStorage> = Arc::new(LocalMediaStorage::new(
        config.media_root.clone(),
        config.media_url.clone(),
    ));
    let importer = ImportService::new(
        store,
        media,
        Duration::from_secs(config.fetch_timeout_secs),
    )?;

    match cli.command {
        Command::Place { source, force } => {
            println!("{}📥 Importing {}...{}", CYAN, source, RESET);
            let report = importer
                .import_place(&source, force)
                .await
                .with_context(|| format!("import of {} failed", source))?;
            print_place(&report);
        }
        Command::All { directory, force } => {
            println!("{}📂 Importing documents from {}...{}", CYAN, directory.display(), RESET);
            let report = importer
                .import_directory(&directory, force)
                .await
                .with_context(|| format!("batch import of {} failed", directory.display()))?;
            print_summary(&report);
        }
    }

    Ok(())
}

fn print_place(report: &ImportReport) {
    match report.outcome {
        UpsertOutcome::Created => println!("{}✅ Created \"{}\"{}", GREEN, report.title, RESET),
        UpsertOutcome::Updated => println!("{}✅ Updated \"{}\"{}", GREEN, report.title, RESET),
        UpsertOutcome::Skipped => {
            println!(
                "{}⚠️  \"{}\" already exists, skipped. Use --force to overwrite.{}",
                YELLOW, report.title, RESET
            );
            return;
        }
    }

    println!("  • Images saved: {}", report.images_saved);
    if report.images_failed > 0 {
        println!("  • {}Images failed: {}{}", RED, report.images_failed, RESET);
        for error in &report.image_errors {
            println!("    - {}", error);
        }
    }
}

fn print_summary(report: &BatchReport) {
    println!("\n{}📋 Import Summary{}", BOLD, RESET);
    println!("──────────────────────────────────────────────");
    println!("  • Files found: {}", report.total_files);
    println!("  • Succeeded: {}{}{}", GREEN, report.succeeded, RESET);
    println!("  • Failed: {}{}{}", RED, report.failed, RESET);
    println!("  • Places created: {}", report.places_created);
    println!("  • Places updated: {}", report.places_updated);
    println!("  • Places skipped: {}{}{}", YELLOW, report.places_skipped, RESET);
    println!(
        "  • Images saved/failed: {}/{}",
        report.images_saved, report.images_failed
    );
    println!("  • Duration: {}s", report.duration_seconds);

    if !report.errors.is_empty() {
        println!("\n{}Errors:{}", RED, RESET);
        for error in &report.errors {
            println!("  - {}", error);
        }
    }
}
