use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::modules::distribution::models::DistributionMode;
use crate::modules::payments::models::{DistributionDetail, PaymentInput};

/// One queued mutating action awaiting connectivity
///
/// Created when a distribution is confirmed while disconnected; retry
/// bookkeeping is mutated on failed replay; removed on success or once the
/// retry budget is exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineAction {
    pub id: String,
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub payload: ActionPayload,
    pub retry_count: u32,
    pub max_retries: u32,
    pub last_error: Option<String>,
}

/// Typed action payload
///
/// A tagged union so replay logic pattern-matches exhaustively instead of
/// shape-checking at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionPayload {
    DistributePayment(DistributePayment),
}

/// Replay data for a payment distribution confirmed offline
///
/// Carries the same inputs the online path takes; replay recomputes against
/// installment state fresh at sync time, so the entry-time distribution
/// rides along as audit data only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributePayment {
    pub client_document: String,
    pub amount: Decimal,
    pub mode: DistributionMode,
    pub manual_overrides: Option<HashMap<String, Decimal>>,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub notes: Option<String>,
    pub collector_id: String,
    pub allow_overpayment: bool,
    /// Distribution computed when the collector confirmed, before queueing
    pub entry_distribution: Vec<DistributionDetail>,
}

impl DistributePayment {
    /// Build the replay input for the online pipeline
    ///
    /// Replay is non-interactive: the collector already confirmed the
    /// distribution at entry time, so the mismatch gate is pre-confirmed
    /// here. Balances may have shifted while offline and the recomputed
    /// total is allowed to differ from the entered amount.
    pub fn to_payment_input(&self) -> PaymentInput {
        PaymentInput {
            client_document: self.client_document.clone(),
            amount: self.amount,
            mode: self.mode,
            manual_overrides: self.manual_overrides.clone(),
            payment_date: self.payment_date,
            payment_method: self.payment_method.clone(),
            notes: self.notes.clone(),
            collector_id: self.collector_id.clone(),
            allow_overpayment: self.allow_overpayment,
            confirm_mismatch: true,
        }
    }
}

impl OfflineAction {
    pub fn new(payload: ActionPayload, max_retries: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().naive_utc(),
            payload,
            retry_count: 0,
            max_retries,
            last_error: None,
        }
    }

    /// Record one failed replay attempt
    pub fn register_failure(&mut self, error: String) {
        self.retry_count += 1;
        self.last_error = Some(error);
    }

    /// Whether the retry budget is spent and the action must be abandoned
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count > self.max_retries
    }
}
