//! Campaign execution engine: phone normalization, deduplication,
//! rate-limited batch dispatch and result aggregation.

pub mod aggregator;
pub mod campaign;
pub mod dedup;
pub mod phone;
pub mod scheduler;
pub mod worker;

pub use aggregator::{CampaignAggregator, RunClock};
pub use campaign::CampaignDispatcher;
pub use dedup::{EligibleSet, RecipientDeduplicator};
pub use scheduler::BatchScheduler;
pub use worker::DispatchWorker;
