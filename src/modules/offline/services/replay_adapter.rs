use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::SyncConfig;
use crate::core::{AppError, Result};
use crate::modules::offline::models::{ActionPayload, DistributePayment, OfflineAction};
use crate::modules::offline::repositories::{JsonFileQueueStore, OfflineQueueStore};
use crate::modules::payments::services::PaymentService;

/// How one queued action settled
#[derive(Debug)]
pub enum ReplayOutcome {
    /// Replayed and persisted; any value the fresh balances could not
    /// absorb is reported, not applied
    Applied {
        action_id: String,
        unapplied_remainder: Decimal,
    },
    /// Retry budget exhausted; the action was removed from the queue and
    /// the payment must be re-entered manually
    Abandoned {
        action_id: String,
        error: AppError,
    },
}

/// Replays queued offline actions once connectivity returns
///
/// Each replay recomputes the distribution against installment state read
/// at sync time, not the state captured at entry time: balances may have
/// moved while offline, and the invariants hold against fresh state rather
/// than the originally-computed numbers.
pub struct OfflineReplayAdapter {
    queue: Arc<dyn OfflineQueueStore>,
    payments: Arc<PaymentService>,
    config: SyncConfig,
}

impl OfflineReplayAdapter {
    pub fn new(
        queue: Arc<dyn OfflineQueueStore>,
        payments: Arc<PaymentService>,
        config: SyncConfig,
    ) -> Self {
        Self {
            queue,
            payments,
            config,
        }
    }

    /// Adapter backed by the durable JSON-file queue at the configured path
    pub fn with_file_store(payments: Arc<PaymentService>, config: SyncConfig) -> Self {
        let queue = Arc::new(JsonFileQueueStore::new(config.queue_path.clone()));
        Self::new(queue, payments, config)
    }

    /// Queue a distribution confirmed while disconnected
    pub async fn enqueue(&self, payload: DistributePayment) -> Result<OfflineAction> {
        let action = OfflineAction::new(
            ActionPayload::DistributePayment(payload),
            self.config.max_retries,
        );

        self.queue.upsert(&action).await?;

        info!(action_id = %action.id, "Offline action queued");

        Ok(action)
    }

    /// Actions still waiting to be replayed, oldest first
    pub async fn pending_actions(&self) -> Result<Vec<OfflineAction>> {
        self.queue.list().await
    }

    /// Drop every queued action (explicit user command); returns how many
    /// were removed
    pub async fn clear_queue(&self) -> Result<usize> {
        let actions = self.queue.list().await?;
        let count = actions.len();

        for action in &actions {
            self.queue.remove(&action.id).await?;
        }

        if count > 0 {
            warn!(cleared = count, "Offline queue cleared by user command");
        }

        Ok(count)
    }

    /// Replay the whole queue, strictly sequentially
    ///
    /// One action fully settles (applied or abandoned) before the next is
    /// attempted, so consecutive actions against the same client never race
    /// each other's balance reads.
    pub async fn process_queue(&self) -> Result<Vec<ReplayOutcome>> {
        let actions = self.queue.list().await?;

        if actions.is_empty() {
            return Ok(Vec::new());
        }

        info!(queued = actions.len(), "Processing offline queue");

        let mut outcomes = Vec::with_capacity(actions.len());
        for action in actions {
            outcomes.push(self.settle_action(action).await?);
        }

        Ok(outcomes)
    }

    /// Attempt one action until it succeeds or its retry budget is spent
    ///
    /// Errors returned here are queue-store failures only; replay failures
    /// feed the retry loop and, ultimately, the `Abandoned` outcome.
    async fn settle_action(&self, mut action: OfflineAction) -> Result<ReplayOutcome> {
        loop {
            match self.replay(&action).await {
                Ok(unapplied_remainder) => {
                    self.queue.remove(&action.id).await?;

                    info!(
                        action_id = %action.id,
                        attempts = action.retry_count + 1,
                        %unapplied_remainder,
                        "Offline action replayed"
                    );

                    return Ok(ReplayOutcome::Applied {
                        action_id: action.id,
                        unapplied_remainder,
                    });
                }
                Err(err) => {
                    action.register_failure(err.to_string());

                    if action.retries_exhausted() {
                        self.queue.remove(&action.id).await?;

                        let error = AppError::ReplayExhausted {
                            action_id: action.id.clone(),
                            attempts: action.retry_count,
                            last_error: err.to_string(),
                        };
                        // The intended payment is lost unless re-entered.
                        error!(
                            action_id = %action.id,
                            attempts = action.retry_count,
                            last_error = %err,
                            "Offline action abandoned, manual re-entry required"
                        );

                        return Ok(ReplayOutcome::Abandoned {
                            action_id: action.id,
                            error,
                        });
                    }

                    // Persist the retry bookkeeping before waiting.
                    self.queue.upsert(&action).await?;

                    let delay = self.backoff_delay(action.retry_count);
                    warn!(
                        action_id = %action.id,
                        retry = action.retry_count,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Offline action replay failed, backing off before retry"
                    );

                    sleep(delay).await;
                }
            }
        }
    }

    /// Re-execute one action through the online pipeline
    async fn replay(&self, action: &OfflineAction) -> Result<Decimal> {
        match &action.payload {
            ActionPayload::DistributePayment(data) => {
                let input = data.to_payment_input();
                let outcome = self.payments.record_payment(&input).await?;

                if outcome.report.has_failures() {
                    return Err(AppError::persistence(outcome.report.failure_summary()));
                }

                Ok(outcome.unapplied_remainder)
            }
        }
    }

    /// Exponential backoff before retry `n`, capped
    fn backoff_delay(&self, retry_number: u32) -> Duration {
        let exponent = retry_number.saturating_sub(1).min(16);
        let delay_ms = self
            .config
            .retry_base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.config.retry_max_delay_ms);

        Duration::from_millis(delay_ms)
    }
}
