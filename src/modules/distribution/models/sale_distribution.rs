use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money;

/// How a payment is allocated across a client's sales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    /// Greedy smallest-pending-first allocation
    Automatic,
    /// Caller supplies a target received amount per sale
    Manual,
}

impl DistributionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Automatic => "automatic",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for DistributionMode {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "automatic" => Ok(Self::Automatic),
            "manual" => Ok(Self::Manual),
            _ => Err(format!("Invalid distribution mode: {}", value)),
        }
    }
}

/// One sale's slice of a computed distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDistributionItem {
    pub sale_number: String,
    pub client_document: String,
    /// Sale's outstanding balance before this payment
    pub pending_before: Decimal,
    /// Sale's received total before this payment
    pub current_received: Decimal,
    /// Portion of the payment allocated to this sale
    pub applied_amount: Decimal,
    /// Sale's received total after this payment
    pub new_received: Decimal,
}

/// Computed allocation of one payment amount across sales
///
/// A deterministic function of current sale state and inputs: whenever the
/// amount or mode changes, the whole preview is recomputed from scratch
/// rather than patched incrementally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionPreview {
    pub amount: Decimal,
    pub mode: DistributionMode,
    /// Entries in apply order; sales with nothing allocated produce none
    pub items: Vec<SaleDistributionItem>,
    pub total_distributed: Decimal,
    /// Portion of the payment no sale could absorb; surfaced, never
    /// silently applied anywhere
    pub unapplied_remainder: Decimal,
}

impl DistributionPreview {
    /// Preview with nothing allocated, used for non-positive amounts
    pub fn empty(amount: Decimal, mode: DistributionMode) -> Self {
        Self {
            amount,
            mode,
            items: Vec::new(),
            total_distributed: Decimal::ZERO,
            unapplied_remainder: Decimal::ZERO,
        }
    }

    /// Signed difference between the entered amount and the distributed total
    pub fn difference(&self) -> Decimal {
        self.amount - self.total_distributed
    }

    /// Whether the distributed total differs from the entered amount beyond
    /// the currency tolerance; the caller must obtain explicit confirmation
    /// before applying such a distribution
    pub fn requires_confirmation(&self) -> bool {
        self.difference().abs() > money::epsilon()
    }
}
