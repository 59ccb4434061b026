use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use krew_leads::export::ExportOutcome;
use krew_leads::funnel::funnel_router;
use krew_leads::gallery::GalleryError;
use krew_leads::newsletter::NewsletterError;
use krew_leads::webhook::{DispatchOutcome, WebhookEvent};

use crate::infra::{AppState, Services};

/// Full API surface: the library's funnel router merged with the admin
/// panel endpoints and the service plumbing routes.
pub(crate) fn api_router(services: Arc<Services>) -> axum::Router {
    let admin = axum::Router::new()
        .route("/api/v1/leads", axum::routing::get(list_leads_endpoint))
        .route(
            "/api/v1/leads/export",
            axum::routing::get(export_leads_endpoint),
        )
        .route(
            "/api/v1/newsletter/subscriptions",
            axum::routing::post(subscribe_endpoint),
        )
        .route(
            "/api/v1/integrations/webhook",
            axum::routing::get(webhook_config_endpoint).put(save_webhook_endpoint),
        )
        .route(
            "/api/v1/integrations/webhook/test",
            axum::routing::post(test_webhook_endpoint),
        )
        .route("/api/v1/gallery", axum::routing::get(list_gallery_endpoint))
        .route(
            "/api/v1/gallery/urls",
            axum::routing::post(add_gallery_url_endpoint),
        )
        .route(
            "/api/v1/gallery/files",
            axum::routing::post(add_gallery_files_endpoint),
        )
        .route(
            "/api/v1/gallery/:index",
            axum::routing::delete(remove_gallery_endpoint),
        )
        .with_state(services.clone());

    funnel_router(services.funnel.clone())
        .merge(admin)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn list_leads_endpoint(
    State(services): State<Arc<Services>>,
) -> impl IntoResponse {
    Json(services.funnel.lead_views())
}

pub(crate) async fn export_leads_endpoint(
    State(services): State<Arc<Services>>,
) -> axum::response::Response {
    match services.exporter.export() {
        Ok(ExportOutcome::Document(document)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, document.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.file_name),
                ),
            ],
            document.content,
        )
            .into_response(),
        Ok(ExportOutcome::NoLeads) => {
            let payload = json!({ "error": "no leads yet to export" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscribeRequest {
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) promo_opt_in: bool,
}

/// Operator feedback mirroring the site's promo alerts.
fn promo_message(outcome: &DispatchOutcome) -> &'static str {
    match outcome {
        DispatchOutcome::Delivered => "Promo code sent — check your inbox.",
        DispatchOutcome::Skipped => "Saved! Connect a webhook in Admin to auto-email codes.",
        DispatchOutcome::Failed { .. } => "Saved locally. Email service not connected.",
    }
}

pub(crate) async fn subscribe_endpoint(
    State(services): State<Arc<Services>>,
    Json(request): Json<SubscribeRequest>,
) -> axum::response::Response {
    let result = if request.promo_opt_in {
        services
            .newsletter
            .subscribe_with_promo(&request.email)
            .await
            .map(Some)
    } else {
        services.newsletter.subscribe(&request.email).map(|()| None)
    };

    match result {
        Ok(Some(outcome)) => {
            let payload = json!({
                "email": request.email.trim(),
                "message": promo_message(&outcome),
                "promo": outcome,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Ok(None) => {
            let payload = json!({ "email": request.email.trim() });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(NewsletterError::EmptyEmail) => {
            let payload = json!({ "error": NewsletterError::EmptyEmail.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WebhookConfigRequest {
    pub(crate) url: String,
}

pub(crate) async fn webhook_config_endpoint(
    State(services): State<Arc<Services>>,
) -> impl IntoResponse {
    Json(json!({ "url": services.dispatcher.configured_url() }))
}

pub(crate) async fn save_webhook_endpoint(
    State(services): State<Arc<Services>>,
    Json(request): Json<WebhookConfigRequest>,
) -> axum::response::Response {
    match services.dispatcher.set_url(&request.url) {
        Ok(()) => {
            let payload = json!({ "url": services.dispatcher.configured_url() });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn test_webhook_endpoint(
    State(services): State<Arc<Services>>,
) -> impl IntoResponse {
    let outcome = services
        .dispatcher
        .dispatch(WebhookEvent::test(Utc::now()))
        .await;
    Json(outcome)
}

pub(crate) async fn list_gallery_endpoint(
    State(services): State<Arc<Services>>,
) -> impl IntoResponse {
    Json(services.gallery.items())
}

#[derive(Debug, Deserialize)]
pub(crate) struct GalleryUrlRequest {
    pub(crate) src: String,
}

pub(crate) async fn add_gallery_url_endpoint(
    State(services): State<Arc<Services>>,
    Json(request): Json<GalleryUrlRequest>,
) -> axum::response::Response {
    match services.gallery.add_by_url(&request.src) {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GalleryFilesRequest {
    pub(crate) paths: Vec<PathBuf>,
}

pub(crate) async fn add_gallery_files_endpoint(
    State(services): State<Arc<Services>>,
    Json(request): Json<GalleryFilesRequest>,
) -> axum::response::Response {
    match services.gallery.add_files(request.paths).await {
        Ok(batch) => (StatusCode::CREATED, Json(batch)).into_response(),
        Err(err @ GalleryError::Read { .. }) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn remove_gallery_endpoint(
    State(services): State<Arc<Services>>,
    Path(index): Path<usize>,
) -> axum::response::Response {
    match services.gallery.remove_at(index) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
