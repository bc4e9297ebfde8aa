//! Provider sanity-check routes: credential check and single test send.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use blastline_common::error::AppError;
use blastline_common::types::OutboundMessage;
use blastline_engine::phone;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test-auth", get(test_auth))
        .route("/test-send", post(test_send))
}

#[derive(Debug, Serialize)]
pub struct TestAuthResponse {
    pub success: bool,
    pub status: &'static str,
    pub sid: String,
}

#[derive(Debug, Deserialize)]
pub struct TestSendRequest {
    pub phone: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSendResponse {
    pub success: bool,
    pub id: String,
    pub provider_status: String,
}

/// GET /test-auth: Confirm the provider accepts the configured credentials.
async fn test_auth(State(state): State<AppState>) -> Result<Json<TestAuthResponse>, AppError> {
    let account = state.dispatcher.provider().verify_credentials().await?;

    tracing::info!(sid = %account.sid, status = %account.status, "Provider credentials verified");

    Ok(Json(TestAuthResponse {
        success: true,
        status: "Authenticated",
        sid: account.sid,
    }))
}

/// POST /test-send: Send one unpersonalized message to a single phone.
async fn test_send(
    State(state): State<AppState>,
    payload: Result<Json<TestSendRequest>, JsonRejection>,
) -> Result<Json<TestSendResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    if req.message.trim().is_empty() {
        return Err(AppError::Validation("Message is required.".to_string()));
    }

    let to = phone::normalize(Some(req.phone.as_str()))
        .map_err(|reason| AppError::Validation(format!("Invalid phone number: {}", reason)))?;

    let message = OutboundMessage {
        from: state.dispatcher.sender().to_string(),
        to: to.into_string(),
        body: req.message,
        media_url: None,
    };

    let receipt = state.dispatcher.provider().send(&message).await.map_err(|e| {
        tracing::warn!(to = %message.to, code = ?e.code, class = %e.class, error = %e, "Test send failed");
        AppError::from(e)
    })?;

    tracing::info!(to = %message.to, message_id = %receipt.id, "Test message sent");

    Ok(Json(TestSendResponse {
        success: true,
        id: receipt.id,
        provider_status: receipt.status,
    }))
}
