use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::{money, AppError, Result};
use crate::modules::distribution::models::{
    DistributionMode, DistributionPreview, SaleDistributionItem,
};
use crate::modules::installments::models::SaleGroup;

/// Computes how a single payment amount is allocated across a client's sales
///
/// Automatic mode walks sales smallest-pending-first so near-complete sales
/// settle first, maximizing the count of sales fully closed per payment.
/// Manual mode trusts caller-supplied per-sale targets and only exposes the
/// resulting totals for consistency validation before commit.
pub struct DistributionEngine;

impl DistributionEngine {
    /// Compute a distribution preview for `amount` over `sales`
    ///
    /// A non-positive amount yields an empty preview, signaling the caller
    /// to block submission. Excess beyond the total outstanding debt is
    /// surfaced as `unapplied_remainder`, never auto-applied.
    pub fn compute(
        sales: &[SaleGroup],
        amount: Decimal,
        mode: DistributionMode,
        manual_overrides: Option<&HashMap<String, Decimal>>,
    ) -> Result<DistributionPreview> {
        if amount <= Decimal::ZERO {
            debug!(%amount, "Non-positive payment amount, returning empty distribution");
            return Ok(DistributionPreview::empty(amount, mode));
        }

        match mode {
            DistributionMode::Automatic => Ok(Self::compute_automatic(sales, amount)),
            DistributionMode::Manual => {
                let overrides = manual_overrides.ok_or_else(|| {
                    AppError::validation("Manual distribution requires per-sale overrides")
                })?;
                Self::compute_manual(sales, amount, overrides)
            }
        }
    }

    /// Greedy allocation, smallest pending balance first
    ///
    /// Ties keep the original fetch order (stable sort). Fully settled
    /// sales produce no entry.
    fn compute_automatic(sales: &[SaleGroup], amount: Decimal) -> DistributionPreview {
        let mut ordered: Vec<&SaleGroup> = sales.iter().collect();
        ordered.sort_by_key(|sale| sale.pending_value());

        let mut items = Vec::new();
        let mut remaining_amount = amount;

        for sale in ordered {
            if remaining_amount <= Decimal::ZERO {
                break;
            }

            let pending = sale.pending_value();
            if pending <= Decimal::ZERO {
                continue;
            }

            let current_received = sale.total_received();
            let applied = remaining_amount.min(pending);

            items.push(SaleDistributionItem {
                sale_number: sale.sale_number.clone(),
                client_document: sale.client_document.clone(),
                pending_before: pending,
                current_received,
                applied_amount: applied,
                new_received: current_received + applied,
            });

            remaining_amount -= applied;
        }

        let total_distributed: Decimal = items.iter().map(|i| i.applied_amount).sum();
        let unapplied_remainder = remaining_amount.max(Decimal::ZERO);

        if unapplied_remainder > Decimal::ZERO {
            warn!(
                %amount,
                %unapplied_remainder,
                "Payment exceeds total outstanding debt, excess left unapplied"
            );
        }

        DistributionPreview {
            amount,
            mode: DistributionMode::Automatic,
            items,
            total_distributed,
            unapplied_remainder,
        }
    }

    /// Caller-directed allocation: each override sets a target received
    /// amount for one sale
    ///
    /// No greedy ordering is enforced; entries follow the original sale
    /// order. A target below the sale's current received total would
    /// decrease a balance and is rejected as malformed.
    fn compute_manual(
        sales: &[SaleGroup],
        amount: Decimal,
        overrides: &HashMap<String, Decimal>,
    ) -> Result<DistributionPreview> {
        for sale_number in overrides.keys() {
            if !sales.iter().any(|s| &s.sale_number == sale_number) {
                return Err(AppError::validation(format!(
                    "Manual override references unknown sale {}",
                    sale_number
                )));
            }
        }

        let mut items = Vec::new();

        for sale in sales {
            let Some(target) = overrides.get(&sale.sale_number) else {
                continue;
            };

            let current_received = sale.total_received();
            let applied = money::round(target - current_received);

            if applied < Decimal::ZERO {
                return Err(AppError::validation(format!(
                    "Manual override for sale {} is below its received total ({} < {})",
                    sale.sale_number, target, current_received
                )));
            }

            if applied == Decimal::ZERO {
                continue;
            }

            items.push(SaleDistributionItem {
                sale_number: sale.sale_number.clone(),
                client_document: sale.client_document.clone(),
                pending_before: sale.pending_value(),
                current_received,
                applied_amount: applied,
                new_received: current_received + applied,
            });
        }

        let total_distributed: Decimal = items.iter().map(|i| i.applied_amount).sum();

        Ok(DistributionPreview {
            amount,
            mode: DistributionMode::Manual,
            items,
            total_distributed,
            unapplied_remainder: (amount - total_distributed).max(Decimal::ZERO),
        })
    }
}
