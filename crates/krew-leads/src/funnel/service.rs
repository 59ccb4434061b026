use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::storage::{Collection, StorageBackend, StorageError, LEADS};

use super::controller::FunnelController;
use super::domain::{FormPatch, FunnelStep, Lead, LeadAdminView, QuoteForm};

/// Identifier wrapper for open wizard sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunnelSessionId(pub String);

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> FunnelSessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    FunnelSessionId(format!("funnel-{id:06}"))
}

/// Serializable snapshot of a session for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelView {
    pub session_id: FunnelSessionId,
    pub step: FunnelStep,
    pub step_label: &'static str,
    pub form: QuoteForm,
    pub lead_score: u8,
}

/// Service owning the open wizard sessions and the leads collection.
/// Submitting appends exactly one lead per successful call.
pub struct LeadFunnelService {
    leads: Collection<Lead>,
    sessions: Mutex<HashMap<FunnelSessionId, FunnelController>>,
}

impl LeadFunnelService {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            leads: Collection::new(backend, LEADS),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Open a fresh session at the `Contact` step.
    pub fn open_session(&self) -> FunnelView {
        let session_id = next_session_id();
        let controller = FunnelController::new();
        let view = snapshot(&session_id, &controller);

        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        sessions.insert(session_id, controller);
        view
    }

    pub fn view(&self, session_id: &FunnelSessionId) -> Result<FunnelView, FunnelError> {
        self.with_session(session_id, |_controller| ())
    }

    pub fn advance(&self, session_id: &FunnelSessionId) -> Result<FunnelView, FunnelError> {
        self.with_session(session_id, FunnelController::advance)
    }

    pub fn retreat(&self, session_id: &FunnelSessionId) -> Result<FunnelView, FunnelError> {
        self.with_session(session_id, FunnelController::retreat)
    }

    pub fn reset(&self, session_id: &FunnelSessionId) -> Result<FunnelView, FunnelError> {
        self.with_session(session_id, FunnelController::reset)
    }

    pub fn update_form(
        &self,
        session_id: &FunnelSessionId,
        patch: FormPatch,
    ) -> Result<FunnelView, FunnelError> {
        self.with_session(session_id, |controller| controller.apply(patch))
    }

    /// Finalize the session's quote request and persist the scored lead.
    pub fn submit(&self, session_id: &FunnelSessionId) -> Result<Lead, FunnelError> {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let controller = sessions
            .get_mut(session_id)
            .ok_or(FunnelError::UnknownSession)?;

        let lead = controller.submit()?;

        let mut stored = self.leads.load();
        stored.push(lead.clone());
        self.leads.save(&stored)?;

        Ok(lead)
    }

    /// Admin panel rows, oldest first (insertion order).
    pub fn lead_views(&self) -> Vec<LeadAdminView> {
        self.leads.load().iter().map(Lead::admin_view).collect()
    }

    fn with_session<F>(
        &self,
        session_id: &FunnelSessionId,
        operation: F,
    ) -> Result<FunnelView, FunnelError>
    where
        F: FnOnce(&mut FunnelController),
    {
        let mut sessions = self.sessions.lock().expect("session mutex poisoned");
        let controller = sessions
            .get_mut(session_id)
            .ok_or(FunnelError::UnknownSession)?;
        operation(controller);
        Ok(snapshot(session_id, controller))
    }
}

fn snapshot(session_id: &FunnelSessionId, controller: &FunnelController) -> FunnelView {
    FunnelView {
        session_id: session_id.clone(),
        step: controller.step(),
        step_label: controller.step().label(),
        form: controller.form().clone(),
        lead_score: controller.current_score(),
    }
}

/// Error raised by the funnel service and controller.
#[derive(Debug, thiserror::Error)]
pub enum FunnelError {
    #[error("quote funnel session not found")]
    UnknownSession,
    #[error("submit is only available from the final step (currently at {})", .step.label())]
    NotAtFinalStep { step: FunnelStep },
    #[error(transparent)]
    Storage(#[from] StorageError),
}
