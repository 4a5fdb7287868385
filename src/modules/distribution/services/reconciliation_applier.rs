use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::{AppError, Result};
use crate::modules::distribution::models::DistributionPreview;
use crate::modules::installments::models::{Installment, InstallmentUpdate, SaleGroup};
use crate::modules::payments::models::{DistributionDetail, PaymentInput, PaymentRecord};

/// Result of expanding a per-sale distribution to installment granularity
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    pub payment_record: PaymentRecord,
    /// Updates in apply order; the persistence gateway must walk them in
    /// this order
    pub installment_updates: Vec<InstallmentUpdate>,
    /// Payment value no installment could absorb
    pub unapplied_remainder: Decimal,
}

/// Turns a computed per-sale distribution into concrete installment
/// mutations plus the audit record
///
/// Computation only: nothing here touches external state. Each sale's
/// allocation is fanned across its installments smallest-remaining-first,
/// mirroring the sale-level greedy policy at installment granularity. An
/// installment never receives more than its outstanding balance unless the
/// caller explicitly allowed overpayment, in which case the excess lands on
/// the sale's last installment.
pub struct ReconciliationApplier;

impl ReconciliationApplier {
    pub fn apply(
        sales: &[SaleGroup],
        preview: &DistributionPreview,
        input: &PaymentInput,
    ) -> Result<ReconciliationResult> {
        let mut updates: Vec<InstallmentUpdate> = Vec::new();
        let mut details: Vec<DistributionDetail> = Vec::new();
        let mut unapplied_remainder = preview.unapplied_remainder;

        for item in &preview.items {
            if item.applied_amount <= Decimal::ZERO {
                continue;
            }

            let sale = sales
                .iter()
                .find(|s| {
                    s.sale_number == item.sale_number
                        && s.client_document == item.client_document
                })
                .ok_or_else(|| {
                    AppError::internal(format!(
                        "Distribution references sale {} absent from the sale set",
                        item.sale_number
                    ))
                })?;

            let leftover =
                Self::apply_to_sale(sale, item.applied_amount, &mut updates, &mut details);

            if leftover > Decimal::ZERO {
                if input.allow_overpayment {
                    Self::overpay_last_installment(sale, leftover, &mut updates, &mut details);
                } else {
                    warn!(
                        sale_number = %item.sale_number,
                        %leftover,
                        "Sale allocation exceeds installment capacity, excess left unapplied"
                    );
                    unapplied_remainder += leftover;
                }
            }
        }

        let distributed: Decimal = details.iter().map(|d| d.applied_amount).sum();
        debug!(
            installments_touched = updates.len(),
            %distributed,
            %unapplied_remainder,
            "Reconciliation computed"
        );

        // Single-sale distributions keep the sale number on the record;
        // cross-sale ones are client-level.
        let mut touched_sales: Vec<&str> = preview
            .items
            .iter()
            .filter(|i| i.applied_amount > Decimal::ZERO)
            .map(|i| i.sale_number.as_str())
            .collect();
        touched_sales.dedup();
        let sale_number = match touched_sales.as_slice() {
            [single] => Some((*single).to_string()),
            _ => None,
        };

        let payment_record = PaymentRecord::new(
            sale_number,
            input.client_document.clone(),
            input.amount,
            input.payment_date,
            input.payment_method.clone(),
            input.notes.clone(),
            input.collector_id.clone(),
            details,
        );

        Ok(ReconciliationResult {
            payment_record,
            installment_updates: updates,
            unapplied_remainder,
        })
    }

    /// Fan one sale's allocation across its installments, smallest
    /// remaining balance first, capping each installment at its outstanding
    /// balance. Returns whatever the sale could not absorb.
    fn apply_to_sale(
        sale: &SaleGroup,
        sale_amount: Decimal,
        updates: &mut Vec<InstallmentUpdate>,
        details: &mut Vec<DistributionDetail>,
    ) -> Decimal {
        let mut ordered: Vec<&Installment> = sale.installments.iter().collect();
        ordered.sort_by_key(|i| i.remaining_balance());

        let mut remaining = sale_amount;

        for installment in ordered {
            if remaining <= Decimal::ZERO {
                break;
            }

            let capacity = installment.remaining_balance();
            if capacity <= Decimal::ZERO {
                continue;
            }

            let applied = remaining.min(capacity);
            let new_received = installment.received_amount + applied;
            let new_status = Installment::derive_status(installment.original_amount, new_received);

            updates.push(InstallmentUpdate {
                installment_id: installment.id.clone(),
                applied_amount: applied,
                new_received,
                new_status,
            });
            details.push(DistributionDetail {
                installment_id: installment.id.clone(),
                original_amount: installment.original_amount,
                applied_amount: applied,
                installment_status: new_status,
            });

            remaining -= applied;
        }

        remaining
    }

    /// Route explicitly-allowed excess onto the sale's last installment in
    /// schedule order, past its face value
    fn overpay_last_installment(
        sale: &SaleGroup,
        excess: Decimal,
        updates: &mut Vec<InstallmentUpdate>,
        details: &mut Vec<DistributionDetail>,
    ) {
        let Some(last) = sale.installments.last() else {
            return;
        };

        warn!(
            sale_number = %sale.sale_number,
            installment_id = %last.id,
            %excess,
            "Applying confirmed overpayment past installment face value"
        );

        if let Some(update) = updates
            .iter_mut()
            .find(|u| u.installment_id == last.id)
        {
            update.applied_amount += excess;
            update.new_received += excess;
            update.new_status = Installment::derive_status(last.original_amount, update.new_received);

            if let Some(detail) = details
                .iter_mut()
                .find(|d| d.installment_id == last.id)
            {
                detail.applied_amount += excess;
                detail.installment_status = update.new_status;
            }
        } else {
            let new_received = last.received_amount + excess;
            let new_status = Installment::derive_status(last.original_amount, new_received);
            updates.push(InstallmentUpdate {
                installment_id: last.id.clone(),
                applied_amount: excess,
                new_received,
                new_status,
            });
            details.push(DistributionDetail {
                installment_id: last.id.clone(),
                original_amount: last.original_amount,
                applied_amount: excess,
                installment_status: new_status,
            });
        }
    }
}
