use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;

use krew_leads::export::LeadExporter;
use krew_leads::funnel::LeadFunnelService;
use krew_leads::gallery::GalleryService;
use krew_leads::newsletter::NewsletterService;
use krew_leads::storage::{StorageBackend, StorageError};
use krew_leads::webhook::WebhookDispatcher;
#[cfg(test)]
use krew_leads::webhook::WebhookTransport;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Durable backend keeping one `<collection>.json` file per collection
/// under the configured data directory. A single mutex serializes the
/// read-modify-write cycles of every caller in this process; writers in
/// other processes still race (last save wins).
pub(crate) struct JsonFileBackend {
    root: PathBuf,
    guard: Mutex<()>,
}

impl JsonFileBackend {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|err| StorageError::Unavailable(err.to_string()))?;
        Ok(Self {
            root,
            guard: Mutex::new(()),
        })
    }

    fn document_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.json"))
    }
}

impl StorageBackend for JsonFileBackend {
    fn read(&self, collection: &str) -> Result<Option<String>, StorageError> {
        let _lock = self.guard.lock().expect("storage mutex poisoned");
        match std::fs::read_to_string(self.document_path(collection)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Unavailable(err.to_string())),
        }
    }

    fn write(&self, collection: &str, document: &str) -> Result<(), StorageError> {
        let _lock = self.guard.lock().expect("storage mutex poisoned");
        std::fs::write(self.document_path(collection), document)
            .map_err(|err| StorageError::Unavailable(err.to_string()))
    }
}

/// The wired-up lead-capture components sharing one backend.
pub(crate) struct Services {
    pub(crate) funnel: Arc<LeadFunnelService>,
    pub(crate) newsletter: Arc<NewsletterService>,
    pub(crate) gallery: Arc<GalleryService>,
    pub(crate) exporter: Arc<LeadExporter>,
    pub(crate) dispatcher: Arc<WebhookDispatcher>,
}

pub(crate) fn build_services(backend: Arc<dyn StorageBackend>) -> Services {
    let dispatcher = Arc::new(WebhookDispatcher::with_http(backend.clone()));
    assemble(backend, dispatcher)
}

#[cfg(test)]
pub(crate) fn build_services_with_transport(
    backend: Arc<dyn StorageBackend>,
    transport: Box<dyn WebhookTransport>,
) -> Services {
    let dispatcher = Arc::new(WebhookDispatcher::new(backend.clone(), transport));
    assemble(backend, dispatcher)
}

fn assemble(backend: Arc<dyn StorageBackend>, dispatcher: Arc<WebhookDispatcher>) -> Services {
    Services {
        funnel: Arc::new(LeadFunnelService::new(backend.clone())),
        newsletter: Arc::new(NewsletterService::new(backend.clone(), dispatcher.clone())),
        gallery: Arc::new(GalleryService::new(backend.clone())),
        exporter: Arc::new(LeadExporter::new(backend)),
        dispatcher,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_backend_round_trips_documents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = JsonFileBackend::new(dir.path()).expect("backend builds");

        assert!(backend.read("leads").expect("read succeeds").is_none());
        backend.write("leads", "[1,2]").expect("write succeeds");
        assert_eq!(
            backend.read("leads").expect("read succeeds").as_deref(),
            Some("[1,2]")
        );
    }

    #[test]
    fn file_backend_survives_process_restarts() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let backend = JsonFileBackend::new(dir.path()).expect("first backend");
            backend.write("gallery", "[]").expect("write succeeds");
        }
        let backend = JsonFileBackend::new(dir.path()).expect("second backend");
        assert_eq!(
            backend.read("gallery").expect("read succeeds").as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn collections_live_in_separate_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = JsonFileBackend::new(dir.path()).expect("backend builds");
        backend.write("leads", "[]").expect("write leads");
        backend
            .write("webhookUrl", "https://hooks.example.com")
            .expect("write webhook url");

        assert!(dir.path().join("leads.json").exists());
        assert!(dir.path().join("webhookUrl.json").exists());
    }
}
