// src/services/importer.rs
// DOCUMENTATION: Place import pipeline
// PURPOSE: Load place documents from files or URLs, upsert them and download their galleries

use crate::db::{PlaceStore, UpsertOutcome};
use crate::errors::PlacesError;
use crate::models::{Place, PlaceDocument, PlaceImage};
use crate::services::media_storage::{extension_for_content_type, sanitize_filename, MediaStorage};
use chrono::Utc;
use percent_encoding::percent_decode_str;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Where a place document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Url(String),
    File(PathBuf),
}

impl DocumentSource {
    /// `http://` and `https://` sources are fetched, anything else is a local path
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            DocumentSource::Url(source.to_string())
        } else {
            DocumentSource::File(PathBuf::from(source))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DocumentSource::Url(url) => url.clone(),
            DocumentSource::File(path) => path.display().to_string(),
        }
    }
}

/// Result of importing one document
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub source: String,
    pub title: String,
    pub place_id: uuid::Uuid,
    pub outcome: UpsertOutcome,
    pub images_saved: u32,
    pub images_failed: u32,
    /// Per-image failures; they never fail the import itself
    pub image_errors: Vec<String>,
}

impl ImportReport {
    fn new(source: String, place: &Place, outcome: UpsertOutcome) -> Self {
        Self {
            source,
            title: place.title.clone(),
            place_id: place.id,
            outcome,
            images_saved: 0,
            images_failed: 0,
            image_errors: Vec::new(),
        }
    }
}

/// Directory import statistics
/// DOCUMENTATION: Tracks results of a batch import; skipped places count as successes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Directory that was scanned
    pub directory: String,
    /// Number of *.json files found
    pub total_files: u32,
    /// Documents imported without a terminal error
    pub succeeded: u32,
    /// Documents that failed (fetch, parse, validation, database)
    pub failed: u32,
    pub places_created: u32,
    pub places_updated: u32,
    pub places_skipped: u32,
    pub images_saved: u32,
    pub images_failed: u32,
    /// Error messages encountered, prefixed with the file name
    pub errors: Vec<String>,
    /// Total import duration in seconds
    pub duration_seconds: u64,
    /// Timestamp when import started
    pub started_at: String,
    /// Timestamp when import completed
    pub completed_at: Option<String>,
}

impl BatchReport {
    pub fn new(directory: String) -> Self {
        Self {
            directory,
            total_files: 0,
            succeeded: 0,
            failed: 0,
            places_created: 0,
            places_updated: 0,
            places_skipped: 0,
            images_saved: 0,
            images_failed: 0,
            errors: Vec::new(),
            duration_seconds: 0,
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
        }
    }

    pub fn record_success(&mut self, report: &ImportReport) {
        self.succeeded += 1;
        match report.outcome {
            UpsertOutcome::Created => self.places_created += 1,
            UpsertOutcome::Updated => self.places_updated += 1,
            UpsertOutcome::Skipped => self.places_skipped += 1,
        }
        self.images_saved += report.images_saved;
        self.images_failed += report.images_failed;
    }

    pub fn record_failure(&mut self, file: &str, error: &PlacesError) {
        self.failed += 1;
        self.errors.push(format!("{}: {}", file, error));
    }

    /// Mark import as completed
    pub fn complete(&mut self, duration: u64) {
        self.duration_seconds = duration;
        self.completed_at = Some(Utc::now().to_rfc3339());
    }
}

/// Import service
/// DOCUMENTATION: Owns the HTTP client used for documents and images
pub struct ImportService {
    store: Arc<dyn PlaceStore>,
    media: Arc<dyn MediaStorage>,
    client: Client,
}

impl ImportService {
    /// Create the service; `fetch_timeout` bounds every document and image request
    pub fn new(
        store: Arc<dyn PlaceStore>,
        media: Arc<dyn MediaStorage>,
        fetch_timeout: Duration,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(fetch_timeout)
            .user_agent(concat!("where-to-go/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlacesError::FetchError(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            store,
            media,
            client,
        })
    }

    /// Import one place from a local path or an http(s) URL
    pub async fn import_place(&self, source: &str, force: bool) -> Result<ImportReport, PlacesError> {
        self.import_from(&DocumentSource::parse(source), force).await
    }

    /// Import a place document
    ///
    /// Process:
    /// 1. Fetch and normalize the document
    /// 2. Upsert the place by title in one transaction (skip / create / overwrite)
    /// 3. Download the images in declared order; failures are recorded, not fatal
    pub async fn import_from(
        &self,
        source: &DocumentSource,
        force: bool,
    ) -> Result<ImportReport, PlacesError> {
        let document = self.load_document(source).await?;
        let fields = document.to_fields()?;

        let upserted = self.store.upsert_place(&fields, force).await?;
        let mut report = ImportReport::new(source.describe(), &upserted.place, upserted.outcome);

        match upserted.outcome {
            UpsertOutcome::Skipped => {
                log::warn!(
                    "Place \"{}\" already exists, skipped. Use force to overwrite.",
                    fields.title
                );
                return Ok(report);
            }
            UpsertOutcome::Created => log::info!("Place \"{}\" created", fields.title),
            UpsertOutcome::Updated => {
                log::info!("Place \"{}\" updated", fields.title);
                self.remove_blobs(&upserted.removed_images).await;
            }
        }

        let urls = document.image_urls();
        if !urls.is_empty() {
            log::info!("Downloading {} images for \"{}\"", urls.len(), fields.title);
        }

        for (order, url) in urls.iter().enumerate() {
            match self.save_image(&upserted.place, url, order).await {
                Ok(image) => {
                    report.images_saved += 1;
                    log::debug!(
                        "Saved image {}/{} as {}",
                        order + 1,
                        urls.len(),
                        image.file_path
                    );
                }
                Err(e) => {
                    log::warn!("Image {}/{} failed: {}", order + 1, urls.len(), e);
                    report.images_failed += 1;
                    report.image_errors.push(e.to_string());
                }
            }
        }

        Ok(report)
    }

    /// Import every *.json file directly inside `dir`
    /// DOCUMENTATION: Files are processed in name order; one file's failure never stops the rest
    pub async fn import_directory(&self, dir: &Path, force: bool) -> Result<BatchReport, PlacesError> {
        let start_time = Instant::now();
        let files = find_json_files(dir).await?;

        let mut report = BatchReport::new(dir.display().to_string());
        report.total_files = files.len() as u32;
        log::info!("Found {} JSON files in {}", files.len(), dir.display());

        for (idx, path) in files.iter().enumerate() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            log::info!("[{}/{}] Loading {}", idx + 1, files.len(), name);

            match self
                .import_from(&DocumentSource::File(path.clone()), force)
                .await
            {
                Ok(single) => report.record_success(&single),
                Err(e) => {
                    log::error!("Failed to load {}: {}", name, e);
                    report.record_failure(&name, &e);
                }
            }
        }

        report.complete(start_time.elapsed().as_secs());

        log::info!(
            "Import of {} finished: {} succeeded, {} failed, {} files",
            report.directory,
            report.succeeded,
            report.failed,
            report.total_files
        );

        Ok(report)
    }

    async fn load_document(&self, source: &DocumentSource) -> Result<PlaceDocument, PlacesError> {
        let bytes = match source {
            DocumentSource::Url(url) => {
                log::info!("Loading place document from URL: {}", url);
                self.fetch_bytes(url)
                    .await
                    .map(|(bytes, _)| bytes)
                    .map_err(PlacesError::FetchError)?
            }
            DocumentSource::File(path) => {
                log::info!("Loading place document from file: {}", path.display());
                tokio::fs::read(path).await.map_err(|e| {
                    if e.kind() == ErrorKind::NotFound {
                        PlacesError::FetchError(format!("file not found: {}", path.display()))
                    } else {
                        PlacesError::FetchError(format!("{}: {}", path.display(), e))
                    }
                })?
            }
        };

        PlaceDocument::from_slice(&bytes)
    }

    /// GET a URL; non-2xx is an error. Returns the body and its content type
    async fn fetch_bytes(&self, url: &str) -> Result<(Vec<u8>, Option<String>), String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?
            .error_for_status()
            .map_err(|e| e.to_string())?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| e.to_string())?;
        Ok((body.to_vec(), content_type))
    }

    async fn save_image(
        &self,
        place: &Place,
        url: &str,
        order: usize,
    ) -> Result<PlaceImage, PlacesError> {
        let image_error = |reason: String| PlacesError::ImageFetchError {
            url: url.to_string(),
            reason,
        };

        let parsed = Url::parse(url).map_err(|e| image_error(e.to_string()))?;
        let (body, content_type) = self.fetch_bytes(url).await.map_err(image_error)?;
        let filename = image_filename(&parsed, order, content_type.as_deref());

        let key = self.media.save(place.id, &filename, &body).await?;

        match self.store.add_image(place.id, &key, order as i32).await {
            Ok(image) => Ok(image),
            Err(e) => {
                // keep storage in step with the rows
                if let Err(cleanup) = self.media.delete(&key).await {
                    log::warn!("Failed to remove orphaned blob {}: {}", key, cleanup);
                }
                Err(e)
            }
        }
    }

    async fn remove_blobs(&self, images: &[PlaceImage]) {
        for image in images {
            if let Err(e) = self.media.delete(&image.file_path).await {
                log::warn!("Failed to remove blob {}: {}", image.file_path, e);
            }
        }
    }
}

/// Stored file name for a downloaded image
/// DOCUMENTATION: Last URL path segment, or `image_<order>.<ext>` when the URL has none
pub fn image_filename(url: &Url, order: usize, content_type: Option<&str>) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .and_then(|name| sanitize_filename(&name))
        .unwrap_or_else(|| format!("image_{}.{}", order, extension_for_content_type(content_type)))
}

/// Non-recursive, name-sorted list of *.json files
async fn find_json_files(dir: &Path) -> Result<Vec<PathBuf>, PlacesError> {
    let is_dir = tokio::fs::metadata(dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return Err(PlacesError::InvalidInput(format!(
            "directory not found: {}",
            dir.display()
        )));
    }

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| PlacesError::InvalidInput(format!("{}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| PlacesError::InvalidInput(format!("{}: {}", dir.display(), e)))?
    {
        let path = entry.path();
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);

        if is_json && is_file {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(PlacesError::NoDocumentsFound(dir.display().to_string()));
    }

    files.sort();
    Ok(files)
}
