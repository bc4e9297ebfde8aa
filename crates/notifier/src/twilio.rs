//! Twilio Programmable Messaging adapter.
//!
//! Sends SMS/MMS through the Messages REST resource and classifies every
//! failure into a [`FailureClass`] before it leaves this module.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

use blastline_common::error::ProviderError;
use blastline_common::ports::MessageProvider;
use blastline_common::types::{AccountInfo, FailureClass, OutboundMessage, ProviderReceipt};

/// Error codes that point at the account, the sender number or messaging
/// policy rather than at a single recipient.
///
/// - 20003: authentication failed / permission denied
/// - 20005: account not active
/// - 21606: `From` number is not SMS-capable for this account
/// - 21608: trial account can only message verified numbers
/// - 21611: `From` number exceeded its outbound queue
/// - 30002: account suspended
const CRITICAL_ERROR_CODES: &[u32] = &[20003, 20005, 21606, 21608, 21611, 30002];

/// Classify a Twilio error code.
pub fn classify(code: Option<u32>) -> FailureClass {
    match code {
        Some(code) if CRITICAL_ERROR_CODES.contains(&code) => FailureClass::Critical,
        Some(_) => FailureClass::Recipient,
        None => FailureClass::Transport,
    }
}

/// Configuration for the Twilio provider.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// REST API base, e.g. `https://api.twilio.com`
    pub api_url: String,
    pub account_sid: String,
    pub auth_token: String,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct AccountResource {
    sid: String,
    status: String,
    friendly_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<u32>,
    message: Option<String>,
}

/// Twilio REST client.
pub struct TwilioProvider {
    client: Client,
    config: TwilioConfig,
}

impl TwilioProvider {
    pub fn new(client: Client, config: TwilioConfig) -> Self {
        tracing::info!(
            account_sid = %config.account_sid,
            api_url = %config.api_url,
            "Twilio provider initialized"
        );
        Self { client, config }
    }

    fn account_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Turn a non-2xx reply into a classified error.
    async fn rejection(response: Response) -> ProviderError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed: Option<ErrorBody> = serde_json::from_str(&text).ok();

        let code = parsed.as_ref().and_then(|b| b.code);
        let message = parsed
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown provider error")
                    .to_string()
            });

        let class = match code {
            Some(_) => classify(code),
            None if status.is_server_error() => FailureClass::Transport,
            None => FailureClass::Recipient,
        };

        ProviderError {
            code,
            message,
            http_status: Some(status.as_u16()),
            class,
        }
    }
}

#[async_trait]
impl MessageProvider for TwilioProvider {
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("From", message.from.as_str()),
            ("To", message.to.as_str()),
        ];
        if !message.body.is_empty() {
            form.push(("Body", message.body.as_str()));
        }
        if let Some(media) = message.media_url.as_deref() {
            form.push(("MediaUrl", media));
        }

        let response = self
            .client
            .post(format!("{}/Messages.json", self.account_url()))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let resource: MessageResource = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(format!("unreadable provider reply: {}", e)))?;

        Ok(ProviderReceipt {
            id: resource.sid,
            status: resource.status,
        })
    }

    async fn verify_credentials(&self) -> Result<AccountInfo, ProviderError> {
        let response = self
            .client
            .get(format!("{}.json", self.account_url()))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await
            .map_err(|e| ProviderError::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let account: AccountResource = response
            .json()
            .await
            .map_err(|e| ProviderError::transport(format!("unreadable provider reply: {}", e)))?;

        tracing::debug!(sid = %account.sid, status = %account.status, "Twilio credentials verified");

        Ok(AccountInfo {
            sid: account.sid,
            status: account.status,
            friendly_name: account.friendly_name,
        })
    }
}
