use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::distribution::models::DistributionMode;

/// Everything a collector enters to record one payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub client_document: String,
    pub amount: Decimal,
    pub mode: DistributionMode,
    /// Target received amount per sale number; required in manual mode
    pub manual_overrides: Option<HashMap<String, Decimal>>,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub notes: Option<String>,
    pub collector_id: String,
    /// Explicitly allow an installment's received total to exceed its face
    /// value; without it, excess is capped and reported as unapplied
    pub allow_overpayment: bool,
    /// Caller confirmed a distributed-total/amount mismatch beyond the
    /// currency tolerance
    pub confirm_mismatch: bool,
}

/// Per-item outcome of persisting a computed update set
///
/// Updates are applied in computed order with no automatic rollback; a
/// failure mid-apply leaves earlier updates in place and is reported here
/// rather than collapsed into one opaque error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceReport {
    /// Installment ids whose updates were persisted
    pub applied: Vec<String>,
    /// Installment ids whose updates failed, with the failure message
    pub failed: Vec<FailedUpdate>,
    pub record_persisted: bool,
    pub record_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedUpdate {
    pub installment_id: String,
    pub error: String,
}

impl PersistenceReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || !self.record_persisted
    }

    /// One-line summary of what failed, for logs and retry bookkeeping
    pub fn failure_summary(&self) -> String {
        let mut parts: Vec<String> = self
            .failed
            .iter()
            .map(|f| format!("installment {}: {}", f.installment_id, f.error))
            .collect();

        if !self.record_persisted {
            match &self.record_error {
                Some(err) => parts.push(format!("payment record: {}", err)),
                None => parts.push("payment record not persisted".to_string()),
            }
        }

        parts.join("; ")
    }
}
