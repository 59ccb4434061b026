//! Best-effort notifications to an operator-configured HTTP endpoint.
//!
//! The endpoint URL lives in the store so the admin panel can change it at
//! runtime. Dispatch is a single POST with no retry; every failure mode is
//! folded into [`DispatchOutcome`] so callers branch on an exhaustive set
//! instead of inspecting flags.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::{StorageBackend, StorageError, WEBHOOK_URL};

/// Events POSTed to the configured endpoint. The serialized shapes are the
/// wire contract consumed by Zapier/Make-style receivers:
/// `{"type":"promo_opt_in","email":...}` and `{"type":"test","now":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WebhookEvent {
    PromoOptIn { email: String },
    Test { now: String },
}

impl WebhookEvent {
    pub fn promo_opt_in(email: impl Into<String>) -> Self {
        Self::PromoOptIn {
            email: email.into(),
        }
    }

    pub fn test(now: DateTime<Utc>) -> Self {
        Self::Test {
            now: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Exhaustive result of a dispatch attempt. `Skipped` (no endpoint
/// configured) is a non-error condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Delivered,
    Skipped,
    Failed { reason: String },
}

/// Transport-level dispatch error, always caught and folded into
/// [`DispatchOutcome::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("webhook request failed: {0}")]
    Request(String),
}

/// Seam between the dispatcher and the HTTP client so tests can record
/// calls without a network.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// POST the event as a JSON body; returns the response status code.
    async fn post_json(&self, url: &str, event: &WebhookEvent) -> Result<u16, TransportError>;
}

/// Production transport backed by a shared reqwest client.
#[derive(Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, event: &WebhookEvent) -> Result<u16, TransportError> {
        let response = self
            .client
            .post(url)
            .json(event)
            .send()
            .await
            .map_err(|err| TransportError::Request(err.to_string()))?;
        Ok(response.status().as_u16())
    }
}

/// Single-attempt dispatcher over the configured endpoint.
pub struct WebhookDispatcher {
    backend: Arc<dyn StorageBackend>,
    transport: Box<dyn WebhookTransport>,
}

impl WebhookDispatcher {
    pub fn new(backend: Arc<dyn StorageBackend>, transport: Box<dyn WebhookTransport>) -> Self {
        Self { backend, transport }
    }

    /// Dispatcher wired to the real HTTP transport.
    pub fn with_http(backend: Arc<dyn StorageBackend>) -> Self {
        Self::new(backend, Box::new(ReqwestTransport::default()))
    }

    /// The configured endpoint, if any. Blank means unset.
    pub fn configured_url(&self) -> Option<String> {
        match self.backend.read(WEBHOOK_URL) {
            Ok(Some(raw)) => {
                let url = raw.trim();
                if url.is_empty() {
                    None
                } else {
                    Some(url.to_string())
                }
            }
            Ok(None) => None,
            Err(err) => {
                warn!(%err, "webhook config read failed, treating as unset");
                None
            }
        }
    }

    /// Save the endpoint; a blank URL clears the configuration.
    pub fn set_url(&self, url: &str) -> Result<(), StorageError> {
        self.backend.write(WEBHOOK_URL, url.trim())
    }

    /// One best-effort POST. Never returns an error: transport failures
    /// and non-2xx responses come back as `Failed`, and a missing endpoint
    /// short-circuits to `Skipped` without touching the network.
    pub async fn dispatch(&self, event: WebhookEvent) -> DispatchOutcome {
        let Some(url) = self.configured_url() else {
            return DispatchOutcome::Skipped;
        };

        match self.transport.post_json(&url, &event).await {
            Ok(status) if (200..300).contains(&status) => DispatchOutcome::Delivered,
            Ok(status) => DispatchOutcome::Failed {
                reason: format!("endpoint returned status {status}"),
            },
            Err(err) => {
                warn!(%err, "webhook dispatch failed");
                DispatchOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use chrono::TimeZone;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Clone)]
    struct RecordingTransport {
        calls: Arc<Mutex<Vec<(String, WebhookEvent)>>>,
        status: u16,
    }

    impl RecordingTransport {
        fn with_status(status: u16) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                status,
            }
        }

        fn calls(&self) -> Vec<(String, WebhookEvent)> {
            self.calls.lock().expect("call mutex poisoned").clone()
        }
    }

    #[async_trait]
    impl WebhookTransport for RecordingTransport {
        async fn post_json(&self, url: &str, event: &WebhookEvent) -> Result<u16, TransportError> {
            self.calls
                .lock()
                .expect("call mutex poisoned")
                .push((url.to_string(), event.clone()));
            Ok(self.status)
        }
    }

    struct OfflineTransport;

    #[async_trait]
    impl WebhookTransport for OfflineTransport {
        async fn post_json(&self, _url: &str, _event: &WebhookEvent) -> Result<u16, TransportError> {
            Err(TransportError::Request("connection refused".to_string()))
        }
    }

    #[test]
    fn promo_opt_in_wire_shape() {
        let event = WebhookEvent::promo_opt_in("test@example.com");
        let value = serde_json::to_value(&event).expect("event serializes");
        assert_eq!(
            value,
            json!({"type": "promo_opt_in", "email": "test@example.com"})
        );
    }

    #[test]
    fn test_event_wire_shape_uses_iso_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();
        let event = WebhookEvent::test(now);
        let value = serde_json::to_value(&event).expect("event serializes");
        assert_eq!(
            value,
            json!({"type": "test", "now": "2025-06-01T12:30:00.000Z"})
        );
    }

    #[tokio::test]
    async fn dispatch_without_url_skips_and_never_calls_transport() {
        let transport = RecordingTransport::with_status(200);
        let backend = Arc::new(MemoryBackend::default());
        let dispatcher = WebhookDispatcher::new(backend, Box::new(transport.clone()));

        let outcome = dispatcher
            .dispatch(WebhookEvent::promo_opt_in("test@example.com"))
            .await;

        assert_eq!(outcome, DispatchOutcome::Skipped);
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_saved_url_counts_as_unset() {
        let backend = Arc::new(MemoryBackend::default());
        let dispatcher = WebhookDispatcher::with_http(backend);
        dispatcher.set_url("   ").expect("save succeeds");

        assert_eq!(dispatcher.configured_url(), None);
        let outcome = dispatcher.dispatch(WebhookEvent::test(Utc::now())).await;
        assert_eq!(outcome, DispatchOutcome::Skipped);
    }

    #[tokio::test]
    async fn successful_post_is_delivered() {
        let transport = RecordingTransport::with_status(204);
        let backend = Arc::new(MemoryBackend::default());
        let dispatcher = WebhookDispatcher::new(backend, Box::new(transport.clone()));
        dispatcher
            .set_url(" https://hooks.example.com/krew ")
            .expect("save succeeds");

        let outcome = dispatcher
            .dispatch(WebhookEvent::promo_opt_in("test@example.com"))
            .await;

        assert_eq!(outcome, DispatchOutcome::Delivered);
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://hooks.example.com/krew");
    }

    #[tokio::test]
    async fn non_success_status_is_failed() {
        let transport = RecordingTransport::with_status(500);
        let backend = Arc::new(MemoryBackend::default());
        let dispatcher = WebhookDispatcher::new(backend, Box::new(transport));
        dispatcher
            .set_url("https://hooks.example.com/krew")
            .expect("save succeeds");

        let outcome = dispatcher.dispatch(WebhookEvent::test(Utc::now())).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                reason: "endpoint returned status 500".to_string()
            }
        );
    }

    #[tokio::test]
    async fn transport_error_is_caught_not_propagated() {
        let backend = Arc::new(MemoryBackend::default());
        let dispatcher = WebhookDispatcher::new(backend, Box::new(OfflineTransport));
        dispatcher
            .set_url("https://hooks.example.com/krew")
            .expect("save succeeds");

        let outcome = dispatcher.dispatch(WebhookEvent::test(Utc::now())).await;
        assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
    }
}
