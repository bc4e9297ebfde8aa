//! Shared application state for the Axum API server.

use std::sync::Arc;
use std::time::Duration;

use blastline_common::config::AppConfig;
use blastline_engine::{BatchScheduler, CampaignDispatcher};
use blastline_notifier::{TwilioConfig, TwilioProvider};
use blastline_sources::{MondayBoardSource, MondayConfig};

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: CampaignDispatcher,
}

impl AppState {
    pub fn new(dispatcher: CampaignDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Wire the monday.com source and Twilio provider from configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let source = MondayBoardSource::new(
            client.clone(),
            MondayConfig {
                api_url: config.monday_api_url.clone(),
                api_key: config.monday_api_key.clone(),
                board_id: config.board_id.clone(),
                phone_column_id: config.monday_phone_column_id.clone(),
                page_limit: config.monday_page_limit,
            },
        );

        let provider = TwilioProvider::new(
            client,
            TwilioConfig {
                api_url: config.twilio_api_url.clone(),
                account_sid: config.twilio_account_sid.clone(),
                auth_token: config.twilio_auth_token.clone(),
            },
        );

        let scheduler = BatchScheduler::new(
            config.dispatch_batch_size,
            Duration::from_millis(config.dispatch_batch_delay_ms),
        );

        tracing::info!(
            batch_size = scheduler.batch_size(),
            batch_delay_ms = config.dispatch_batch_delay_ms,
            "Campaign dispatcher configured"
        );

        Ok(Self::new(CampaignDispatcher::new(
            Arc::new(source),
            Arc::new(provider),
            config.twilio_from.clone(),
            scheduler,
        )))
    }
}
