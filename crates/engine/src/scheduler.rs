//! Rate-limited batch scheduling.
//!
//! Eligible recipients are cut into consecutive batches of at most
//! `batch_size`. Every member of a batch is dispatched as its own task; the
//! scheduler waits for the whole batch before it sleeps `inter_batch_delay`
//! and issues the next one, which keeps throughput at or below `batch_size`
//! messages per delay interval.
//!
//! Tasks hand back `(index, outcome)` pairs and results are slotted by index
//! after the batch barrier, so output order always equals input order.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinSet;

use blastline_common::types::{DispatchOutcome, NormalizedRecipient};

/// Default number of recipients dispatched concurrently.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default pause between batches.
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchScheduler {
    batch_size: usize,
    inter_batch_delay: Duration,
}

impl BatchScheduler {
    /// A `batch_size` of zero is treated as one.
    pub fn new(batch_size: usize, inter_batch_delay: Duration) -> Self {
        if batch_size == 0 {
            tracing::warn!("Batch size of 0 requested, dispatching one recipient per batch");
        }
        Self {
            batch_size: batch_size.max(1),
            inter_batch_delay,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn inter_batch_delay(&self) -> Duration {
        self.inter_batch_delay
    }

    /// Number of batches needed for `recipients` recipients.
    pub fn batch_count(&self, recipients: usize) -> usize {
        recipients.div_ceil(self.batch_size)
    }

    /// Number of inter-batch pauses a run over `recipients` recipients takes.
    pub fn delay_count(&self, recipients: usize) -> usize {
        self.batch_count(recipients).saturating_sub(1)
    }

    /// Dispatch every recipient through `send`, batch by batch.
    ///
    /// Returns exactly one outcome per recipient, in input order. A task that
    /// panics is reported as a failed outcome for its recipient.
    pub async fn run<F, Fut>(
        &self,
        eligible: Vec<NormalizedRecipient>,
        send: F,
    ) -> Vec<DispatchOutcome>
    where
        F: Fn(NormalizedRecipient) -> Fut,
        Fut: Future<Output = DispatchOutcome> + Send + 'static,
    {
        let total_batches = self.batch_count(eligible.len());
        let mut outcomes = Vec::with_capacity(eligible.len());

        for (batch_index, batch) in eligible.chunks(self.batch_size).enumerate() {
            if batch_index > 0 {
                tracing::debug!(
                    delay_ms = self.inter_batch_delay.as_millis() as u64,
                    "Pausing before next batch"
                );
                tokio::time::sleep(self.inter_batch_delay).await;
            }

            let results = Self::dispatch_batch(batch, &send).await;
            let sent = results.iter().filter(|o| o.is_sent()).count();

            tracing::info!(
                batch = batch_index + 1,
                total_batches,
                size = batch.len(),
                sent,
                failed = batch.len() - sent,
                "Batch dispatched"
            );

            outcomes.extend(results);
        }

        outcomes
    }

    /// Fan out one batch and wait for every task (the barrier).
    async fn dispatch_batch<F, Fut>(
        batch: &[NormalizedRecipient],
        send: &F,
    ) -> Vec<DispatchOutcome>
    where
        F: Fn(NormalizedRecipient) -> Fut,
        Fut: Future<Output = DispatchOutcome> + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        for (index, recipient) in batch.iter().cloned().enumerate() {
            let dispatch = send(recipient);
            tasks.spawn(async move { (index, dispatch.await) });
        }

        let mut slots: Vec<Option<DispatchOutcome>> = vec![None; batch.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "Dispatch task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(batch)
            .map(|(slot, recipient)| {
                slot.unwrap_or_else(|| {
                    DispatchOutcome::aborted(recipient, "task panicked or was cancelled")
                })
            })
            .collect()
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_INTER_BATCH_DELAY)
    }
}
