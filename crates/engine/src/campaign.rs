//! Campaign orchestration.
//!
//! One `run` call processes one campaign end to end:
//! 1. Reject requests with nothing to send
//! 2. Fetch the recipient records (any failure aborts the run)
//! 3. Normalize and deduplicate phones, honoring the resume token
//! 4. Dispatch in rate-limited batches
//! 5. Aggregate outcomes into a report

use std::sync::Arc;

use tracing::Instrument;

use blastline_common::error::AppError;
use blastline_common::ports::{MessageProvider, RecordSource};
use blastline_common::types::{CampaignReport, CampaignRequest};

use crate::aggregator::{CampaignAggregator, RunClock};
use crate::dedup::{EligibleSet, RecipientDeduplicator};
use crate::scheduler::BatchScheduler;
use crate::worker::DispatchWorker;

/// Request-scoped campaign runner wired to injected collaborators.
#[derive(Clone)]
pub struct CampaignDispatcher {
    source: Arc<dyn RecordSource>,
    provider: Arc<dyn MessageProvider>,
    sender: String,
    scheduler: BatchScheduler,
}

impl CampaignDispatcher {
    pub fn new(
        source: Arc<dyn RecordSource>,
        provider: Arc<dyn MessageProvider>,
        sender: impl Into<String>,
        scheduler: BatchScheduler,
    ) -> Self {
        Self {
            source,
            provider,
            sender: sender.into(),
            scheduler,
        }
    }

    pub fn provider(&self) -> &Arc<dyn MessageProvider> {
        &self.provider
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Execute one campaign to completion.
    ///
    /// Per-recipient failures are part of the report; only validation and
    /// record source failures return `Err`, and nothing has been sent when
    /// they do.
    pub async fn run(&self, request: &CampaignRequest) -> Result<CampaignReport, AppError> {
        if !request.has_content() {
            return Err(AppError::Validation(
                "Message or image is required.".to_string(),
            ));
        }

        let clock = RunClock::start();
        let span = tracing::info_span!("campaign", campaign_id = %clock.campaign_id);

        self.execute(request, clock).instrument(span).await
    }

    async fn execute(
        &self,
        request: &CampaignRequest,
        clock: RunClock,
    ) -> Result<CampaignReport, AppError> {
        let records = self.source.fetch_records().await.map_err(|e| {
            tracing::error!(error = %e, "Record source fetch failed, aborting campaign");
            AppError::from(e)
        })?;

        let EligibleSet { recipients, counts } =
            RecipientDeduplicator::build_eligible(&records, &request.already_sent_keys);

        tracing::info!(
            total = records.len(),
            unique = counts.unique,
            duplicates = counts.duplicates,
            invalid = counts.invalid,
            batches = self.scheduler.batch_count(recipients.len()),
            "Recipients resolved"
        );

        let worker = DispatchWorker::new(
            self.provider.clone(),
            self.sender.clone(),
            non_blank(&request.message_template),
            non_blank(&request.media_url),
        );

        let outcomes = self
            .scheduler
            .run(recipients, move |recipient| {
                let worker = worker.clone();
                async move { worker.send(&recipient).await }.instrument(tracing::Span::current())
            })
            .await;

        let report = CampaignAggregator::aggregate(outcomes, counts, records.len(), clock);

        tracing::info!(
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            duration_ms = report.summary.duration_ms,
            "Campaign finished"
        );

        if report.summary.critical_failures > 0 {
            tracing::warn!(
                critical_failures = report.summary.critical_failures,
                "Provider reported account-level failures; review before resuming this campaign"
            );
        }

        Ok(report)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}
