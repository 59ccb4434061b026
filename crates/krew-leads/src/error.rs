use crate::config::ConfigError;
use crate::export::ExportError;
use crate::funnel::FunnelError;
use crate::gallery::GalleryError;
use crate::newsletter::NewsletterError;
use crate::storage::StorageError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Storage(StorageError),
    Export(ExportError),
    Gallery(GalleryError),
    Funnel(FunnelError),
    Newsletter(NewsletterError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Storage(err) => write!(f, "storage error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
            AppError::Gallery(err) => write!(f, "gallery error: {}", err),
            AppError::Funnel(err) => write!(f, "funnel error: {}", err),
            AppError::Newsletter(err) => write!(f, "newsletter error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Storage(err) => Some(err),
            AppError::Export(err) => Some(err),
            AppError::Gallery(err) => Some(err),
            AppError::Funnel(err) => Some(err),
            AppError::Newsletter(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Gallery(_) | AppError::Funnel(_) | AppError::Newsletter(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Storage(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

impl From<GalleryError> for AppError {
    fn from(value: GalleryError) -> Self {
        Self::Gallery(value)
    }
}

impl From<FunnelError> for AppError {
    fn from(value: FunnelError) -> Self {
        Self::Funnel(value)
    }
}

impl From<NewsletterError> for AppError {
    fn from(value: NewsletterError) -> Self {
        Self::Newsletter(value)
    }
}
