//! Collection storage behind an injectable backend.
//!
//! Each collection is persisted as one JSON document under a fixed name.
//! Backends only move document strings; `Collection` owns the
//! (de)serialization and the degrade-to-empty policy for missing or
//! corrupt data.

mod memory;

pub use memory::MemoryBackend;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Captured quote requests.
pub const LEADS: &str = "leads";
/// Newsletter signups.
pub const NEWSLETTER: &str = "newsletter";
/// Gallery photos, newest first.
pub const GALLERY: &str = "gallery";
/// Operator-configured webhook endpoint (single string, not a sequence).
pub const WEBHOOK_URL: &str = "webhookUrl";

/// Storage abstraction so every component can be exercised against an
/// in-memory backend while the service binary wires up a durable one.
pub trait StorageBackend: Send + Sync {
    fn read(&self, collection: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, collection: &str, document: &str) -> Result<(), StorageError>;
}

/// Error enumeration for backend failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("collection serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Typed handle over one named collection.
///
/// `load` never fails: absent documents, unreadable backends, and corrupt
/// JSON all come back as an empty collection (the demo data is not a source
/// of truth). `save` fully overwrites; callers read, mutate a copy, and
/// write back.
pub struct Collection<T> {
    backend: Arc<dyn StorageBackend>,
    name: &'static str,
    _marker: PhantomData<T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            name: self.name,
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(backend: Arc<dyn StorageBackend>, name: &'static str) -> Self {
        Self {
            backend,
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn load(&self) -> Vec<T> {
        let raw = match self.backend.read(self.name) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(collection = self.name, %err, "collection read failed, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(err) => {
                warn!(collection = self.name, %err, "collection corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    pub fn save(&self, items: &[T]) -> Result<(), StorageError> {
        let document = serde_json::to_string(items)?;
        self.backend.write(self.name, &document)
    }
}
