// src/services/media_storage.rs
// DOCUMENTATION: Blob storage for place images
// PURPOSE: Store image bytes per place and derive their public URLs

use crate::errors::PlacesError;
use async_trait::async_trait;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

/// Characters left as-is inside one URL path segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// "Store blob, get URL" capability
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persist `content` for a place and return its storage key
    async fn save(&self, place_id: Uuid, filename: &str, content: &[u8])
        -> Result<String, PlacesError>;

    async fn read(&self, key: &str) -> Result<Vec<u8>, PlacesError>;

    /// Remove a blob; a missing blob is not an error
    async fn delete(&self, key: &str) -> Result<(), PlacesError>;

    /// Public (percent-encoded) URL for a storage key
    fn url(&self, key: &str) -> String;
}

/// Filesystem-backed media storage
/// DOCUMENTATION: Blobs live at `<root>/places/<place_id>/<filename>`
pub struct LocalMediaStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Map a storage key onto the filesystem, refusing anything that escapes the root
    fn resolve(&self, key: &str) -> Result<PathBuf, PlacesError> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(PlacesError::InvalidInput(format!("invalid media key: {}", key)));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn save(
        &self,
        place_id: Uuid,
        filename: &str,
        content: &[u8],
    ) -> Result<String, PlacesError> {
        let dir_key = format!("places/{}", place_id);
        let dir = self.resolve(&dir_key)?;
        fs::create_dir_all(&dir).await.map_err(|e| {
            log::error!("Failed to create media directory {}: {}", dir.display(), e);
            PlacesError::StorageError(e.to_string())
        })?;

        let filename = sanitize_filename(filename).unwrap_or_else(|| "image".to_string());
        let (stem, ext) = split_extension(&filename);

        // create_new makes the collision check and the write one step
        for attempt in 0u32.. {
            let candidate = match (attempt, ext) {
                (0, _) => filename.clone(),
                (n, Some(ext)) => format!("{}_{}.{}", stem, n, ext),
                (n, None) => format!("{}_{}", stem, n),
            };
            let path = dir.join(&candidate);

            let file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await;

            match file {
                Ok(file) => {
                    write_new_file(file, &path, content).await?;
                    return Ok(format!("{}/{}", dir_key, candidate));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    log::error!("Failed to create {}: {}", path.display(), e);
                    return Err(PlacesError::StorageError(e.to_string()));
                }
            }
        }

        Err(PlacesError::StorageError(format!(
            "no free file name for {}",
            filename
        )))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, PlacesError> {
        let path = self.resolve(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(PlacesError::NotFound(format!("media {}", key)))
            }
            Err(e) => Err(PlacesError::StorageError(e.to_string())),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), PlacesError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                log::error!("Failed to delete {}: {}", path.display(), e);
                Err(PlacesError::StorageError(e.to_string()))
            }
        }
    }

    fn url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect();
        format!("{}/{}", self.base_url, encoded.join("/"))
    }
}

/// Write a freshly created file; on failure the partial file is removed so its
/// name is free for the next save
async fn write_new_file<W>(mut file: W, path: &Path, content: &[u8]) -> Result<(), PlacesError>
where
    W: AsyncWrite + Unpin,
{
    let written = match file.write_all(content).await {
        Ok(()) => file.flush().await,
        Err(e) => Err(e),
    };

    if let Err(e) = written {
        log::error!("Failed to write {}: {}", path.display(), e);
        drop(file);
        if let Err(cleanup) = fs::remove_file(path).await {
            log::warn!("Failed to remove partial file {}: {}", path.display(), cleanup);
        }
        return Err(PlacesError::StorageError(e.to_string()));
    }
    Ok(())
}

/// Reduce an arbitrary name to a single safe path segment
pub fn sanitize_filename(name: &str) -> Option<String> {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}

/// Percent-decode a URL for display
pub fn decode_url(url: &str) -> String {
    percent_decode_str(url).decode_utf8_lossy().into_owned()
}

/// File extension for an image `Content-Type`, `jpg` when unknown
pub fn extension_for_content_type(content_type: Option<&str>) -> &'static str {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("image/png") => "png",
        Some("image/gif") => "gif",
        Some("image/webp") => "webp",
        Some("image/svg+xml") => "svg",
        Some("image/bmp") => "bmp",
        _ => "jpg",
    }
}

/// `Content-Type` for serving a stored file
pub fn content_type_for_path(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
