//! Locally stored photo gallery for the "Recent Jobs & Trucks" section.
//!
//! Photos arrive two ways: a pasted URL (stored as-is) or files from disk,
//! which are decoded into embeddable base64 data URLs. File decodes run as
//! independent tasks and the finished batch lands ahead of existing items
//! with a single collection write, so a slow file never leaves a partial
//! batch behind.

use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Collection, StorageBackend, StorageError, GALLERY};

/// Caption used for URL-added photos.
pub const DEFAULT_ALT: &str = "Gallery photo";

/// One displayed photo: a URL or data URL, a caption, and when it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub src: String,
    pub alt: String,
    pub ts: DateTime<Utc>,
}

/// Error raised while adding photos.
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("file decode task failed: {0}")]
    Join(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Ordered photo collection, newest first.
pub struct GalleryService {
    items: Collection<GalleryItem>,
}

impl GalleryService {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            items: Collection::new(backend, GALLERY),
        }
    }

    pub fn items(&self) -> Vec<GalleryItem> {
        self.items.load()
    }

    /// Prepend a photo referenced by URL.
    pub fn add_by_url(&self, url: &str) -> Result<GalleryItem, GalleryError> {
        let item = GalleryItem {
            src: url.to_string(),
            alt: DEFAULT_ALT.to_string(),
            ts: Utc::now(),
        };

        let mut stored = self.items.load();
        stored.insert(0, item.clone());
        self.items.save(&stored)?;
        Ok(item)
    }

    /// Decode every file concurrently, then prepend the whole batch
    /// (input order preserved) with one write.
    pub async fn add_files(&self, paths: Vec<PathBuf>) -> Result<Vec<GalleryItem>, GalleryError> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let tasks: Vec<_> = paths
            .into_iter()
            .map(|path| tokio::spawn(decode_file(path)))
            .collect();

        let mut batch = Vec::with_capacity(tasks.len());
        for task in tasks {
            let item = task
                .await
                .map_err(|err| GalleryError::Join(err.to_string()))??;
            batch.push(item);
        }

        let stored = self.items.load();
        let mut next = batch.clone();
        next.extend(stored);
        self.items.save(&next)?;
        Ok(batch)
    }

    /// Remove the photo at `index`; out-of-range indexes are ignored.
    pub fn remove_at(&self, index: usize) -> Result<(), GalleryError> {
        let mut stored = self.items.load();
        if index < stored.len() {
            stored.remove(index);
            self.items.save(&stored)?;
        }
        Ok(())
    }
}

/// Read one file and wrap it as a `data:` URL, captioned with its name.
async fn decode_file(path: PathBuf) -> Result<GalleryItem, GalleryError> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| GalleryError::Read {
            path: path.clone(),
            source,
        })?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let alt = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_ALT.to_string());

    Ok(GalleryItem {
        src: format!("data:{};base64,{}", mime, BASE64.encode(&bytes)),
        alt,
        ts: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use std::io::Write as _;

    fn service() -> GalleryService {
        GalleryService::new(Arc::new(MemoryBackend::default()))
    }

    fn temp_image(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create temp image");
        file.write_all(bytes).expect("write temp image");
        path
    }

    #[test]
    fn url_photos_are_prepended() {
        let gallery = service();
        gallery.add_by_url("https://example.com/a.jpg").expect("first");
        gallery.add_by_url("https://example.com/b.jpg").expect("second");

        let items = gallery.items();
        assert_eq!(items[0].src, "https://example.com/b.jpg");
        assert_eq!(items[1].src, "https://example.com/a.jpg");
        assert_eq!(items[0].alt, DEFAULT_ALT);
    }

    #[tokio::test]
    async fn file_batch_lands_ahead_of_existing_in_input_order() {
        let gallery = service();
        gallery.add_by_url("https://example.com/old.jpg").expect("seed");

        let dir = tempfile::tempdir().expect("tempdir");
        let first = temp_image(&dir, "truck.png", b"png-bytes");
        let second = temp_image(&dir, "crew.jpg", b"jpg-bytes");

        let batch = gallery
            .add_files(vec![first, second])
            .await
            .expect("batch decodes");
        assert_eq!(batch.len(), 2);

        let url = gallery.add_by_url("https://example.com/new.jpg").expect("url add");

        let items = gallery.items();
        let sources: Vec<&str> = items.iter().map(|item| item.src.as_str()).collect();
        assert_eq!(sources[0], url.src);
        assert!(sources[1].starts_with("data:image/png;base64,"));
        assert!(sources[2].starts_with("data:image/jpeg;base64,"));
        assert_eq!(sources[3], "https://example.com/old.jpg");

        assert_eq!(items[1].alt, "truck.png");
        assert_eq!(items[2].alt, "crew.jpg");
    }

    #[tokio::test]
    async fn missing_file_fails_the_whole_batch_without_writing() {
        let gallery = service();
        gallery.add_by_url("https://example.com/old.jpg").expect("seed");

        let dir = tempfile::tempdir().expect("tempdir");
        let good = temp_image(&dir, "ok.png", b"png-bytes");
        let missing = dir.path().join("missing.png");

        let result = gallery.add_files(vec![good, missing]).await;
        assert!(matches!(result, Err(GalleryError::Read { .. })));
        assert_eq!(gallery.items().len(), 1);
    }

    #[test]
    fn remove_at_drops_the_indexed_photo() {
        let gallery = service();
        gallery.add_by_url("https://example.com/a.jpg").expect("a");
        gallery.add_by_url("https://example.com/b.jpg").expect("b");

        gallery.remove_at(0).expect("remove newest");
        let items = gallery.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].src, "https://example.com/a.jpg");
    }

    #[test]
    fn remove_at_out_of_range_is_a_no_op() {
        let gallery = service();
        gallery.add_by_url("https://example.com/a.jpg").expect("a");
        gallery.remove_at(5).expect("no-op");
        assert_eq!(gallery.items().len(), 1);
    }
}
