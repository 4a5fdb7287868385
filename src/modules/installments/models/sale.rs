use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money;
use crate::modules::installments::models::{Installment, InstallmentStatus};

/// Derived grouping of installments sharing one `(sale_number,
/// client_document)` identity
///
/// Never persisted; always recomputed on demand from current installment
/// state so it cannot go stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleGroup {
    pub sale_number: String,
    pub client_document: String,
    /// Installments in original fetch order
    pub installments: Vec<Installment>,
}

impl SaleGroup {
    pub fn total_value(&self) -> Decimal {
        self.installments.iter().map(|i| i.original_amount).sum()
    }

    pub fn total_received(&self) -> Decimal {
        self.installments.iter().map(|i| i.received_amount).sum()
    }

    /// Outstanding balance for the whole sale, clamped at zero
    pub fn pending_value(&self) -> Decimal {
        money::remaining(self.total_value(), self.total_received())
    }
}

/// Sale-level status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    PartiallyPaid,
    FullyPaid,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallyPaid => "partially_paid",
            Self::FullyPaid => "fully_paid",
        }
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for SaleStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "fully_paid" => Ok(Self::FullyPaid),
            _ => Err(format!("Invalid sale status: {}", value)),
        }
    }
}

/// Snapshot of one sale's totals with a per-installment breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleBalance {
    pub sale_number: String,
    pub client_document: String,
    pub total_value: Decimal,
    pub total_paid: Decimal,
    pub remaining_balance: Decimal,
    pub status: SaleStatus,
    pub installment_breakdown: Vec<InstallmentBalance>,
}

/// Per-installment entry of a [`SaleBalance`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentBalance {
    pub installment_id: String,
    pub original_amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining: Decimal,
    pub status: InstallmentStatus,
}
