//! Campaign dispatch route.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use blastline_common::error::AppError;
use blastline_common::types::{CampaignRequest, CampaignSummary, DispatchOutcome};
use blastline_engine::phone::digits_of;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/send-messages", post(send_messages))
}

/// Request body for a campaign run.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagesRequest {
    /// Body template; `{name}` is replaced per recipient
    pub message: Option<String>,
    pub image_url: Option<String>,
    /// `sentPhoneKeys` of a previous run
    #[serde(default)]
    pub already_sent_phones: Vec<String>,
}

impl SendMessagesRequest {
    /// Resume keys are reduced to digits so echoed keys and typed numbers match.
    fn into_campaign(self) -> CampaignRequest {
        CampaignRequest {
            message_template: self.message,
            media_url: self.image_url,
            already_sent_keys: self
                .already_sent_phones
                .iter()
                .map(|p| digits_of(p))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagesResponse {
    pub success: bool,
    pub campaign_id: Uuid,
    pub results: Vec<DispatchOutcome>,
    pub sent_phone_keys: Vec<String>,
    pub summary: CampaignSummary,
}

/// POST /send-messages: Fetch board recipients and message every unique one.
async fn send_messages(
    State(state): State<AppState>,
    payload: Result<Json<SendMessagesRequest>, JsonRejection>,
) -> Result<Json<SendMessagesResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let request = req.into_campaign();

    let report = state.dispatcher.run(&request).await?;

    Ok(Json(SendMessagesResponse {
        success: true,
        campaign_id: report.campaign_id,
        results: report.outcomes,
        sent_phone_keys: report.sent_dedup_keys.into_iter().collect(),
        summary: report.summary,
    }))
}
