use std::sync::Arc;

use chrono::NaiveDate;

use crate::funnel::domain::{BudgetRange, FormPatch, MoveSize, MoveTiming, ServiceSelections};
use crate::funnel::service::{FunnelSessionId, LeadFunnelService};
use crate::storage::{MemoryBackend, StorageBackend};

pub(super) fn build_service() -> (LeadFunnelService, Arc<dyn StorageBackend>) {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::default());
    let service = LeadFunnelService::new(backend.clone());
    (service, backend)
}

/// A form the wizard would accept end to end: a Philadelphia-to-Outer-Banks
/// single family move with packing added.
pub(super) fn filled_patch() -> FormPatch {
    FormPatch {
        name: Some("Daniel R.".to_string()),
        email: Some("daniel@example.com".to_string()),
        phone: Some("(267) 555-0101".to_string()),
        from_zip: Some("19103".to_string()),
        to_zip: Some("27949".to_string()),
        date: NaiveDate::from_ymd_opt(2025, 11, 8),
        size: Some(MoveSize::SingleFamilyHome),
        services: Some(ServiceSelections {
            packing: true,
            ..ServiceSelections::default()
        }),
        timing: Some(MoveTiming::Within30Days),
        budget: Some(BudgetRange::Usd2000To4000),
        notes: Some("Piano on the second floor".to_string()),
    }
}

pub(super) fn open_filled_session(service: &LeadFunnelService) -> FunnelSessionId {
    let view = service.open_session();
    let session_id = view.session_id;
    service
        .update_form(&session_id, filled_patch())
        .expect("patch applies");
    for _ in 0..3 {
        service.advance(&session_id).expect("session advances");
    }
    session_id
}
