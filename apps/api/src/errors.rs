use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::generation::{ErrorKind, PipelineError};
use crate::settings::SettingsError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A typed pipeline failure. Its message is already user-facing.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

fn pipeline_status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::MissingCredential => StatusCode::BAD_REQUEST,
        ErrorKind::RateLimitedOrOverloaded => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::ContentBlocked | ErrorKind::ExtractionFailed | ErrorKind::FieldNotFound => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::ProviderRejected | ErrorKind::MalformedResponse => StatusCode::BAD_GATEWAY,
        ErrorKind::TransportUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::GenerationInProgress => StatusCode::CONFLICT,
        ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(err) => {
                tracing::warn!("Pipeline error ({:?}): {}", err.kind, err.message);
                (pipeline_status(err.kind), err.kind.code(), err.message.clone())
            }
            AppError::Settings(SettingsError::Invalid { key, reason }) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Invalid value for '{key}': {reason}"),
            ),
            AppError::Settings(e) => {
                tracing::error!("Settings error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SETTINGS_ERROR",
                    "Could not access settings".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
