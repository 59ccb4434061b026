//! End-to-end specifications for the quote funnel: wizard navigation,
//! scoring at submission, persistence, and the CSV export consuming the
//! same collection, all through the public facade.

use std::sync::Arc;

use krew_leads::export::{ExportOutcome, LeadExporter};
use krew_leads::funnel::{
    FormPatch, FunnelError, FunnelStep, LeadFunnelService, MoveSize, MoveTiming,
    ServiceSelections,
};
use krew_leads::storage::{MemoryBackend, StorageBackend};

fn backend() -> Arc<dyn StorageBackend> {
    Arc::new(MemoryBackend::default())
}

fn contact_patch() -> FormPatch {
    FormPatch {
        name: Some("Jasmine P.".to_string()),
        email: Some("jasmine@example.com".to_string()),
        phone: Some("(267) 555-0199".to_string()),
        ..FormPatch::default()
    }
}

fn move_details_patch() -> FormPatch {
    FormPatch {
        from_zip: Some("19103".to_string()),
        to_zip: Some("27949".to_string()),
        date: chrono::NaiveDate::from_ymd_opt(2025, 10, 18),
        size: Some(MoveSize::Townhouse),
        ..FormPatch::default()
    }
}

fn services_patch() -> FormPatch {
    FormPatch {
        services: Some(ServiceSelections {
            packing: true,
            junk: true,
            ..ServiceSelections::default()
        }),
        ..FormPatch::default()
    }
}

#[test]
fn wizard_walk_collects_scores_and_persists_one_lead() {
    let backend = backend();
    let funnel = LeadFunnelService::new(backend.clone());

    let view = funnel.open_session();
    let session = view.session_id;
    assert_eq!(view.step, FunnelStep::Contact);

    funnel.update_form(&session, contact_patch()).expect("contact");
    funnel.advance(&session).expect("to move details");
    funnel
        .update_form(&session, move_details_patch())
        .expect("move details");
    funnel.advance(&session).expect("to services");
    funnel.update_form(&session, services_patch()).expect("services");
    let view = funnel.advance(&session).expect("to budget");
    assert_eq!(view.step, FunnelStep::Budget);

    // distance 2 + townhouse 3 + three services 3 + ASAP 2
    assert_eq!(view.lead_score, 10);

    let lead = funnel.submit(&session).expect("submit persists");
    assert_eq!(lead.lead_score, 10);
    assert_eq!(lead.timing, MoveTiming::Asap);
    assert!(lead.services.assembly);

    let views = funnel.lead_views();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].route, "19103 → 27949");
}

#[test]
fn submit_is_rejected_until_the_budget_step() {
    let funnel = LeadFunnelService::new(backend());
    let session = funnel.open_session().session_id;

    assert!(matches!(
        funnel.submit(&session),
        Err(FunnelError::NotAtFinalStep { .. })
    ));
    assert!(funnel.lead_views().is_empty());
}

#[test]
fn export_sees_what_the_funnel_stored() {
    let backend = backend();
    let funnel = LeadFunnelService::new(backend.clone());
    let exporter = LeadExporter::new(backend.clone());

    assert_eq!(
        exporter.export().expect("empty export runs"),
        ExportOutcome::NoLeads
    );

    let session = funnel.open_session().session_id;
    funnel.update_form(&session, contact_patch()).expect("contact");
    for _ in 0..3 {
        funnel.advance(&session).expect("advance");
    }
    funnel.submit(&session).expect("submit persists");

    let outcome = exporter.export().expect("export runs");
    let document = match outcome {
        ExportOutcome::Document(document) => document,
        ExportOutcome::NoLeads => panic!("expected a document"),
    };
    assert_eq!(document.file_name, "neighborhood-krew-leads.csv");
    assert_eq!(document.content.lines().count(), 2);
    assert!(document.content.contains("Jasmine P."));
}

#[test]
fn corrupt_lead_storage_degrades_to_a_fresh_collection() {
    let backend = backend();
    backend
        .write("leads", "{\"definitely\": \"not a lead array\"")
        .expect("seed corrupt document");

    let funnel = LeadFunnelService::new(backend.clone());
    assert!(funnel.lead_views().is_empty());

    let session = funnel.open_session().session_id;
    funnel.update_form(&session, contact_patch()).expect("contact");
    for _ in 0..3 {
        funnel.advance(&session).expect("advance");
    }
    funnel.submit(&session).expect("submit overwrites corruption");
    assert_eq!(funnel.lead_views().len(), 1);
}
