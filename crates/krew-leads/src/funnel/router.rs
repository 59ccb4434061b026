use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde_json::json;

use super::domain::FormPatch;
use super::service::{FunnelError, FunnelSessionId, LeadFunnelService};

/// Router builder exposing the quote wizard over HTTP.
pub fn funnel_router(service: Arc<LeadFunnelService>) -> Router {
    Router::new()
        .route("/api/v1/funnel/sessions", post(open_session_handler))
        .route("/api/v1/funnel/sessions/:session_id", get(view_handler))
        .route(
            "/api/v1/funnel/sessions/:session_id/advance",
            post(advance_handler),
        )
        .route(
            "/api/v1/funnel/sessions/:session_id/retreat",
            post(retreat_handler),
        )
        .route(
            "/api/v1/funnel/sessions/:session_id/form",
            patch(update_form_handler),
        )
        .route(
            "/api/v1/funnel/sessions/:session_id/submit",
            post(submit_handler),
        )
        .route(
            "/api/v1/funnel/sessions/:session_id/reset",
            post(reset_handler),
        )
        .with_state(service)
}

pub(crate) async fn open_session_handler(
    State(service): State<Arc<LeadFunnelService>>,
) -> Response {
    let view = service.open_session();
    (StatusCode::CREATED, axum::Json(view)).into_response()
}

pub(crate) async fn view_handler(
    State(service): State<Arc<LeadFunnelService>>,
    Path(session_id): Path<String>,
) -> Response {
    funnel_response(service.view(&FunnelSessionId(session_id)))
}

pub(crate) async fn advance_handler(
    State(service): State<Arc<LeadFunnelService>>,
    Path(session_id): Path<String>,
) -> Response {
    funnel_response(service.advance(&FunnelSessionId(session_id)))
}

pub(crate) async fn retreat_handler(
    State(service): State<Arc<LeadFunnelService>>,
    Path(session_id): Path<String>,
) -> Response {
    funnel_response(service.retreat(&FunnelSessionId(session_id)))
}

pub(crate) async fn reset_handler(
    State(service): State<Arc<LeadFunnelService>>,
    Path(session_id): Path<String>,
) -> Response {
    funnel_response(service.reset(&FunnelSessionId(session_id)))
}

pub(crate) async fn update_form_handler(
    State(service): State<Arc<LeadFunnelService>>,
    Path(session_id): Path<String>,
    axum::Json(patch): axum::Json<FormPatch>,
) -> Response {
    funnel_response(service.update_form(&FunnelSessionId(session_id), patch))
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<LeadFunnelService>>,
    Path(session_id): Path<String>,
) -> Response {
    match service.submit(&FunnelSessionId(session_id)) {
        Ok(lead) => (StatusCode::CREATED, axum::Json(lead)).into_response(),
        Err(error) => error_response(error),
    }
}

fn funnel_response(
    result: Result<super::service::FunnelView, FunnelError>,
) -> Response {
    match result {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: FunnelError) -> Response {
    let status = match &error {
        FunnelError::UnknownSession => StatusCode::NOT_FOUND,
        FunnelError::NotAtFinalStep { .. } => StatusCode::CONFLICT,
        FunnelError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
