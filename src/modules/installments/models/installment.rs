use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{money, AppError, Result};

/// One scheduled debt payment line item
///
/// Installments are created by an external import process and mutated only
/// through the reconciliation pipeline; they are never deleted here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Installment {
    pub id: String,
    /// Sale this installment belongs to; `(sale_number, client_document)`
    /// is the composite sale identity
    pub sale_number: String,
    pub client_document: String,
    /// Immutable face value of the installment
    pub original_amount: Decimal,
    /// Running total applied to this installment; never decreases
    pub received_amount: Decimal,
    /// Derived tag, recomputed whenever `received_amount` changes
    #[sqlx(try_from = "String")]
    pub status: InstallmentStatus,
    /// Date of the most recent payment applied to this installment
    pub received_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Nothing received yet
    Pending,
    /// Some value received, balance still open
    PartiallyPaid,
    /// Balance settled within the currency tolerance
    Paid,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for InstallmentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "paid" => Ok(Self::Paid),
            _ => Err(format!("Invalid installment status: {}", value)),
        }
    }
}

impl Installment {
    /// Create a new installment with nothing received yet
    pub fn new(
        sale_number: String,
        client_document: String,
        original_amount: Decimal,
    ) -> Result<Self> {
        if original_amount <= Decimal::ZERO {
            return Err(AppError::validation(
                "Installment original amount must be positive",
            ));
        }

        money::validate_amount(original_amount).map_err(AppError::validation)?;

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            sale_number,
            client_document,
            original_amount,
            received_amount: Decimal::ZERO,
            status: InstallmentStatus::Pending,
            received_date: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Outstanding balance, clamped at zero
    pub fn remaining_balance(&self) -> Decimal {
        money::remaining(self.original_amount, self.received_amount)
    }

    /// Whether the installment is settled within the currency tolerance
    pub fn is_settled(&self) -> bool {
        money::is_settled(self.original_amount, self.received_amount)
    }

    /// Derive the status tag for a given original/received pair
    ///
    /// `paid` iff the remaining balance is within the currency tolerance;
    /// `partially_paid` iff anything has been received; else `pending`.
    pub fn derive_status(original_amount: Decimal, received_amount: Decimal) -> InstallmentStatus {
        if money::is_settled(original_amount, received_amount) {
            InstallmentStatus::Paid
        } else if received_amount > Decimal::ZERO {
            InstallmentStatus::PartiallyPaid
        } else {
            InstallmentStatus::Pending
        }
    }

    /// Recompute the derived status from the current amounts
    pub fn recompute_status(&mut self) {
        self.status = Self::derive_status(self.original_amount, self.received_amount);
    }
}

/// Computed mutation for a single installment, produced by the
/// reconciliation applier and consumed by the persistence gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentUpdate {
    pub installment_id: String,
    /// Portion of the payment applied to this installment
    pub applied_amount: Decimal,
    pub new_received: Decimal,
    pub new_status: InstallmentStatus,
}
