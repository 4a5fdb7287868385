use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::money;
use crate::modules::installments::models::InstallmentStatus;

/// Append-only audit record of one confirmed payment distribution
///
/// Created once per confirmed distribution and immutable thereafter. The
/// distribution details carry one entry per touched installment, in apply
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentRecord {
    pub id: String,
    /// Set when the whole payment landed on a single sale; `None` for a
    /// client-level distribution across sales
    pub sale_number: Option<String>,
    pub client_document: String,
    pub payment_amount: Decimal,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub notes: Option<String>,
    pub collector_id: String,
    #[sqlx(skip)]
    pub distribution_details: Vec<DistributionDetail>,
    pub created_at: NaiveDateTime,
}

/// One touched installment inside a [`PaymentRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DistributionDetail {
    pub installment_id: String,
    pub original_amount: Decimal,
    pub applied_amount: Decimal,
    /// Installment status after the payment was applied
    #[sqlx(try_from = "String")]
    pub installment_status: InstallmentStatus,
}

impl PaymentRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sale_number: Option<String>,
        client_document: String,
        payment_amount: Decimal,
        payment_date: NaiveDate,
        payment_method: String,
        notes: Option<String>,
        collector_id: String,
        distribution_details: Vec<DistributionDetail>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sale_number,
            client_document,
            payment_amount,
            payment_date,
            payment_method,
            notes,
            collector_id,
            distribution_details,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Sum of applied amounts over the distribution details
    pub fn distributed_total(&self) -> Decimal {
        self.distribution_details
            .iter()
            .map(|d| d.applied_amount)
            .sum()
    }

    /// Whether the details reconcile against the payment amount within the
    /// currency tolerance
    pub fn reconciles(&self) -> bool {
        (self.payment_amount - self.distributed_total()).abs() <= money::epsilon()
    }
}
