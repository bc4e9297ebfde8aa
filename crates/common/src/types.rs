use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recipient row as delivered by the record source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub display_name: String,
    pub raw_phone_text: Option<String>,
}

impl RawRecord {
    pub fn new(display_name: impl Into<String>, raw_phone_text: Option<&str>) -> Self {
        Self {
            display_name: display_name.into(),
            raw_phone_text: raw_phone_text.map(str::to_string),
        }
    }
}

/// A recipient whose phone number survived normalization and deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecipient {
    pub display_name: String,
    /// Phone text exactly as the record source returned it
    pub raw_phone_text: String,
    /// Dialable form, e.g. `+14045550100`
    pub canonical_phone: String,
    /// Digits-only form of `canonical_phone`; unique within a campaign run
    pub dedup_key: String,
}

/// Caller-supplied parameters for one campaign run.
#[derive(Debug, Clone, Default)]
pub struct CampaignRequest {
    /// Body template; every `{name}` is replaced with the recipient's name
    pub message_template: Option<String>,
    pub media_url: Option<String>,
    /// Dedup keys delivered by a previous run (the resume token)
    pub already_sent_keys: HashSet<String>,
}

impl CampaignRequest {
    /// Whether the request carries anything to send.
    pub fn has_content(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.message_template) || present(&self.media_url)
    }
}

/// Notification delivery status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Classification of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureClass {
    /// Affects only this recipient (bad number, opted out, ...)
    Recipient,
    /// Account, sender number or policy level; later sends will likely fail too
    Critical,
    /// The provider could not be reached or its reply could not be read
    Transport,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureClass::Recipient => write!(f, "recipient"),
            FailureClass::Critical => write!(f, "critical"),
            FailureClass::Transport => write!(f, "transport"),
        }
    }
}

/// Message handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub body: String,
    pub media_url: Option<String>,
}

/// Provider acknowledgement of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderReceipt {
    pub id: String,
    /// Provider-side delivery state at acceptance time (e.g. `queued`)
    pub status: String,
}

/// Result of the provider credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub sid: String,
    pub status: String,
    pub friendly_name: Option<String>,
}

/// Outcome of one attempted delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub display_name: String,
    pub raw_phone_text: String,
    pub canonical_phone: String,
    pub dedup_key: String,
    pub status: DeliveryStatus,
    pub provider_message_id: Option<String>,
    pub provider_status: Option<String>,
    pub error_code: Option<u32>,
    pub error_message: Option<String>,
    pub failure_class: Option<FailureClass>,
}

impl DispatchOutcome {
    pub fn sent(recipient: &NormalizedRecipient, receipt: ProviderReceipt) -> Self {
        Self {
            status: DeliveryStatus::Sent,
            provider_message_id: Some(receipt.id),
            provider_status: Some(receipt.status),
            ..Self::blank(recipient)
        }
    }

    pub fn failed(recipient: &NormalizedRecipient, err: &crate::error::ProviderError) -> Self {
        Self {
            error_code: err.code,
            error_message: Some(err.message.clone()),
            failure_class: Some(err.class),
            ..Self::blank(recipient)
        }
    }

    /// Outcome for a dispatch task that ended without reporting back.
    pub fn aborted(recipient: &NormalizedRecipient, reason: impl std::fmt::Display) -> Self {
        Self {
            error_message: Some(format!("dispatch task aborted: {}", reason)),
            ..Self::blank(recipient)
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }

    pub fn is_critical(&self) -> bool {
        self.failure_class == Some(FailureClass::Critical)
    }

    fn blank(recipient: &NormalizedRecipient) -> Self {
        Self {
            display_name: recipient.display_name.clone(),
            raw_phone_text: recipient.raw_phone_text.clone(),
            canonical_phone: recipient.canonical_phone.clone(),
            dedup_key: recipient.dedup_key.clone(),
            status: DeliveryStatus::Failed,
            provider_message_id: None,
            provider_status: None,
            error_code: None,
            error_message: None,
            failure_class: None,
        }
    }
}

/// Counters produced while building the eligible recipient set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupCounts {
    /// Resume skips plus repeated phone numbers
    pub duplicates: usize,
    /// Records with a missing or unusable phone number
    pub invalid: usize,
    pub unique: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSummary {
    pub total: usize,
    pub duplicates: usize,
    pub invalid: usize,
    pub unique: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub critical_failures: usize,
    pub duration_ms: u64,
}

/// Terminal artifact of a campaign run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignReport {
    pub campaign_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One entry per eligible recipient, in record source order
    pub outcomes: Vec<DispatchOutcome>,
    /// Resume token for a follow-up run
    pub sent_dedup_keys: BTreeSet<String>,
    pub summary: CampaignSummary,
}
