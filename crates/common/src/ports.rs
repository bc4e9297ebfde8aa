//! Contracts for the two external collaborators of a campaign run.
//!
//! The engine only sees these traits; concrete HTTP adapters live in
//! `blastline-sources` and `blastline-notifier`.

use async_trait::async_trait;

use crate::error::{ProviderError, SourceError};
use crate::types::{AccountInfo, OutboundMessage, ProviderReceipt, RawRecord};

/// Source of campaign recipients.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the full recipient list for one run.
    async fn fetch_records(&self) -> Result<Vec<RawRecord>, SourceError>;
}

/// Outbound messaging provider.
#[async_trait]
pub trait MessageProvider: Send + Sync {
    /// Submit one message for delivery.
    async fn send(&self, message: &OutboundMessage) -> Result<ProviderReceipt, ProviderError>;

    /// Read-only credential check used by the health surface.
    async fn verify_credentials(&self) -> Result<AccountInfo, ProviderError>;
}
