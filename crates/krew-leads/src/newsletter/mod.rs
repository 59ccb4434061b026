//! Newsletter signups plus the promo opt-in flow from the thank-you screen.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Collection, StorageBackend, StorageError, NEWSLETTER};
use crate::webhook::{DispatchOutcome, WebhookDispatcher, WebhookEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscription {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Error raised by the subscription service.
#[derive(Debug, thiserror::Error)]
pub enum NewsletterError {
    #[error("subscription email must not be empty")]
    EmptyEmail,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Service composing the subscriber collection with the promo webhook.
pub struct NewsletterService {
    subscriptions: Collection<NewsletterSubscription>,
    dispatcher: Arc<WebhookDispatcher>,
}

impl NewsletterService {
    pub fn new(backend: Arc<dyn StorageBackend>, dispatcher: Arc<WebhookDispatcher>) -> Self {
        Self {
            subscriptions: Collection::new(backend, NEWSLETTER),
            dispatcher,
        }
    }

    /// Insert the email unless it is already subscribed. Subscribing twice
    /// leaves exactly one stored record.
    pub fn subscribe(&self, email: &str) -> Result<(), NewsletterError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(NewsletterError::EmptyEmail);
        }

        let mut stored = self.subscriptions.load();
        if stored.iter().any(|subscription| subscription.email == email) {
            return Ok(());
        }

        stored.push(NewsletterSubscription {
            email: email.to_string(),
            created_at: Utc::now(),
        });
        self.subscriptions.save(&stored)?;
        Ok(())
    }

    /// Subscribe and notify the promo webhook. The subscription is stored
    /// first; the dispatch outcome is reported but never undoes the store.
    pub async fn subscribe_with_promo(
        &self,
        email: &str,
    ) -> Result<DispatchOutcome, NewsletterError> {
        self.subscribe(email)?;
        let outcome = self
            .dispatcher
            .dispatch(WebhookEvent::promo_opt_in(email.trim()))
            .await;
        Ok(outcome)
    }

    pub fn subscriptions(&self) -> Vec<NewsletterSubscription> {
        self.subscriptions.load()
    }
}
