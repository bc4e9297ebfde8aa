//! Campaign result aggregation. Pure: no I/O.

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use blastline_common::types::{CampaignReport, CampaignSummary, DedupCounts, DispatchOutcome};

/// Identity and timing of a run, captured before the record fetch.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    pub campaign_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub started: Instant,
}

impl RunClock {
    pub fn start() -> Self {
        Self {
            campaign_id: Uuid::new_v4(),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }
}

pub struct CampaignAggregator;

impl CampaignAggregator {
    /// Fold outcomes and dedup counters into the final report.
    pub fn aggregate(
        outcomes: Vec<DispatchOutcome>,
        counts: DedupCounts,
        total_records: usize,
        clock: RunClock,
    ) -> CampaignReport {
        let succeeded = outcomes.iter().filter(|o| o.is_sent()).count();
        let critical_failures = outcomes.iter().filter(|o| o.is_critical()).count();

        let sent_dedup_keys: BTreeSet<String> = outcomes
            .iter()
            .filter(|o| o.is_sent())
            .map(|o| o.dedup_key.clone())
            .collect();

        let summary = CampaignSummary {
            total: total_records,
            duplicates: counts.duplicates,
            invalid: counts.invalid,
            unique: counts.unique,
            succeeded,
            failed: outcomes.len() - succeeded,
            critical_failures,
            duration_ms: clock.started.elapsed().as_millis() as u64,
        };

        CampaignReport {
            campaign_id: clock.campaign_id,
            started_at: clock.started_at,
            finished_at: Utc::now(),
            outcomes,
            sent_dedup_keys,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use blastline_common::error::ProviderError;
    use blastline_common::types::{FailureClass, NormalizedRecipient, ProviderReceipt};

    use super::*;

    fn recipient(key: &str) -> NormalizedRecipient {
        NormalizedRecipient {
            display_name: format!("R{}", key),
            raw_phone_text: key.to_string(),
            canonical_phone: format!("+{}", key),
            dedup_key: key.to_string(),
        }
    }

    fn sent(key: &str) -> DispatchOutcome {
        DispatchOutcome::sent(
            &recipient(key),
            ProviderReceipt {
                id: format!("SM{}", key),
                status: "queued".to_string(),
            },
        )
    }

    fn failed(key: &str, code: u32, class: FailureClass) -> DispatchOutcome {
        DispatchOutcome::failed(
            &recipient(key),
            &ProviderError {
                code: Some(code),
                message: "failed".to_string(),
                http_status: Some(400),
                class,
            },
        )
    }

    #[test]
    fn test_aggregate_counts_and_resume_token() {
        let outcomes = vec![
            sent("14045550101"),
            failed("14045550102", 21211, FailureClass::Recipient),
            sent("14045550103"),
            failed("14045550104", 20003, FailureClass::Critical),
        ];
        let counts = DedupCounts {
            duplicates: 2,
            invalid: 1,
            unique: 4,
        };

        let report = CampaignAggregator::aggregate(outcomes, counts, 7, RunClock::start());

        assert_eq!(report.summary.total, 7);
        assert_eq!(report.summary.duplicates, 2);
        assert_eq!(report.summary.invalid, 1);
        assert_eq!(report.summary.unique, 4);
        assert_eq!(report.summary.succeeded, 2);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.critical_failures, 1);
        assert_eq!(
            report.sent_dedup_keys.into_iter().collect::<Vec<_>>(),
            vec!["14045550101".to_string(), "14045550103".to_string()]
        );
        assert_eq!(report.outcomes.len(), 4);
        assert!(report.finished_at >= report.started_at);
    }

    #[test]
    fn test_aggregate_preserves_outcome_order() {
        let outcomes = vec![sent("3"), sent("1"), sent("2")];
        let report = CampaignAggregator::aggregate(
            outcomes,
            DedupCounts::default(),
            3,
            RunClock::start(),
        );
        let keys: Vec<&str> = report.outcomes.iter().map(|o| o.dedup_key.as_str()).collect();
        assert_eq!(keys, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_aggregate_empty_run() {
        let report = CampaignAggregator::aggregate(
            Vec::new(),
            DedupCounts::default(),
            0,
            RunClock::start(),
        );
        assert_eq!(report.summary.succeeded, 0);
        assert_eq!(report.summary.failed, 0);
        assert!(report.sent_dedup_keys.is_empty());
    }
}
