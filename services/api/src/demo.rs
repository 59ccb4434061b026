use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use krew_leads::error::AppError;
use krew_leads::export::ExportOutcome;
use krew_leads::funnel::{FormPatch, MoveSize, ServiceSelections};
use krew_leads::storage::{MemoryBackend, StorageBackend};
use krew_leads::webhook::DispatchOutcome;

use crate::infra::{build_services, Services};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Webhook endpoint to notify during the demo (promo opt-in and test).
    /// Without one, dispatches report as skipped.
    #[arg(long)]
    pub(crate) webhook_url: Option<String>,
    /// Image files to import into the gallery during the demo
    #[arg(long)]
    pub(crate) photo: Vec<PathBuf>,
}

/// Scripted walk through the whole lead-capture surface against a
/// throwaway in-memory store: wizard, scoring, promo opt-in, gallery,
/// CSV export.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::default());
    let services = build_services(backend);

    if let Some(url) = &args.webhook_url {
        services.dispatcher.set_url(url)?;
        println!("Webhook endpoint: {url}");
    } else {
        println!("Webhook endpoint: none (dispatches will be skipped)");
    }

    println!("\n60-Second Move Quote walk-through");
    walk_the_wizard(&services)?;

    println!("\nPromo opt-in");
    let outcome = services
        .newsletter
        .subscribe_with_promo("jasmine@example.com")
        .await
        .map_err(AppError::from)?;
    println!("  subscription stored; dispatch {}", describe(&outcome));

    println!("\nGallery");
    services
        .gallery
        .add_by_url("https://images.example.com/crew-truck.jpg")
        .map_err(AppError::from)?;
    if !args.photo.is_empty() {
        let batch = services.gallery.add_files(args.photo.clone()).await?;
        println!("  imported {} photo file(s)", batch.len());
    }
    for item in services.gallery.items() {
        println!("  {} ({})", item.alt, truncated(&item.src));
    }

    println!("\nWebhook connectivity test");
    let outcome = services
        .dispatcher
        .dispatch(krew_leads::webhook::WebhookEvent::test(chrono::Utc::now()))
        .await;
    println!("  {}", describe(&outcome));

    println!("\nCSV export");
    match services.exporter.export().map_err(AppError::from)? {
        ExportOutcome::NoLeads => println!("  no leads yet to export"),
        ExportOutcome::Document(document) => {
            println!("  {} ({} bytes)", document.file_name, document.content.len());
            for line in document.content.lines().take(2) {
                println!("  {line}");
            }
        }
    }

    Ok(())
}

fn walk_the_wizard(services: &Services) -> Result<(), AppError> {
    let funnel = &services.funnel;
    let view = funnel.open_session();
    let session = view.session_id;
    println!("  step: {}", view.step_label);

    funnel
        .update_form(
            &session,
            FormPatch {
                name: Some("Jasmine P.".to_string()),
                email: Some("jasmine@example.com".to_string()),
                phone: Some("(267) 555-0199".to_string()),
                ..FormPatch::default()
            },
        )
        .map_err(AppError::from)?;
    let view = funnel.advance(&session).map_err(AppError::from)?;
    println!("  step: {}", view.step_label);

    funnel
        .update_form(
            &session,
            FormPatch {
                from_zip: Some("19103".to_string()),
                to_zip: Some("27949".to_string()),
                date: chrono::NaiveDate::from_ymd_opt(2025, 11, 8),
                size: Some(MoveSize::SingleFamilyHome),
                ..FormPatch::default()
            },
        )
        .map_err(AppError::from)?;
    let view = funnel.advance(&session).map_err(AppError::from)?;
    println!("  step: {}", view.step_label);

    funnel
        .update_form(
            &session,
            FormPatch {
                services: Some(ServiceSelections {
                    packing: true,
                    ..ServiceSelections::default()
                }),
                ..FormPatch::default()
            },
        )
        .map_err(AppError::from)?;
    let view = funnel.advance(&session).map_err(AppError::from)?;
    println!("  step: {}", view.step_label);

    let lead = funnel.submit(&session).map_err(AppError::from)?;
    println!(
        "  submitted: {} ({} → {}), priority {}/10",
        lead.name, lead.from_zip, lead.to_zip, lead.lead_score
    );
    Ok(())
}

fn describe(outcome: &DispatchOutcome) -> String {
    match outcome {
        DispatchOutcome::Delivered => "delivered".to_string(),
        DispatchOutcome::Skipped => "skipped (no endpoint configured)".to_string(),
        DispatchOutcome::Failed { reason } => format!("failed: {reason}"),
    }
}

fn truncated(src: &str) -> String {
    match src.char_indices().nth(48) {
        Some((index, _)) => format!("{}…", &src[..index]),
        None => src.to_string(),
    }
}
