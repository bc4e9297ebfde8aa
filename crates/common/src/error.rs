use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::types::FailureClass;

/// Failures while loading the recipient list from the record source.
///
/// Every variant is fatal to a campaign run: nothing is sent.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("record source unreachable: {0}")]
    Transport(String),

    #[error("record source returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("record source query failed: {0}")]
    Query(String),

    #[error("malformed record source response: {0}")]
    Malformed(String),
}

/// A failed call to the message provider.
///
/// The provider adapter classifies the failure once when it builds this value;
/// callers read `class` instead of inspecting codes.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProviderError {
    /// Provider-specific error code, when the provider returned one
    pub code: Option<u32>,
    /// Human-readable error message
    pub message: String,
    /// HTTP status of the provider reply, absent for transport failures
    pub http_status: Option<u16>,
    pub class: FailureClass,
}

impl ProviderError {
    /// A failure that never produced a decodable provider reply.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            http_status: None,
            class: FailureClass::Transport,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.class == FailureClass::Critical
    }
}

/// Common error types used across the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] SourceError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Provider(err) => (StatusCode::BAD_GATEWAY, err.message.clone()),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = json!({ "success": false, "error": message });
        (status, Json(body)).into_response()
    }
}
