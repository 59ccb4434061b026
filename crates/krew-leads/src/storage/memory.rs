use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{StorageBackend, StorageError};

/// Backend keeping every collection in process memory. Used by tests and
/// the CLI demo; the service binary wires a durable backend instead.
#[derive(Default, Clone)]
pub struct MemoryBackend {
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl StorageBackend for MemoryBackend {
    fn read(&self, collection: &str) -> Result<Option<String>, StorageError> {
        let guard = self.documents.lock().expect("storage mutex poisoned");
        Ok(guard.get(collection).cloned())
    }

    fn write(&self, collection: &str, document: &str) -> Result<(), StorageError> {
        let mut guard = self.documents.lock().expect("storage mutex poisoned");
        guard.insert(collection.to_string(), document.to_string());
        Ok(())
    }
}
