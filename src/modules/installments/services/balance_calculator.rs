use rust_decimal::Decimal;
use tracing::debug;

use crate::core::money;
use crate::modules::installments::models::{
    Installment, InstallmentBalance, SaleBalance, SaleGroup, SaleStatus,
};

/// Calculator for sale-level balances
///
/// Pure functions over fetched installment state; re-run after every apply
/// step to refresh the derived totals shown to collectors.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Compute one sale's totals and per-installment breakdown
    ///
    /// Input installments are expected to share one `(sale_number,
    /// client_document)` identity. An empty slice yields a zeroed `pending`
    /// balance rather than an error.
    pub fn calculate_sale_balance(installments: &[Installment]) -> SaleBalance {
        let (sale_number, client_document) = installments
            .first()
            .map(|i| (i.sale_number.clone(), i.client_document.clone()))
            .unwrap_or_default();

        let total_value: Decimal = installments.iter().map(|i| i.original_amount).sum();
        let total_paid: Decimal = installments.iter().map(|i| i.received_amount).sum();
        let remaining_balance = money::remaining(total_value, total_paid);

        let installment_breakdown = installments
            .iter()
            .map(|i| InstallmentBalance {
                installment_id: i.id.clone(),
                original_amount: i.original_amount,
                paid_amount: i.received_amount,
                remaining: i.remaining_balance(),
                status: Installment::derive_status(i.original_amount, i.received_amount),
            })
            .collect();

        SaleBalance {
            sale_number,
            client_document,
            total_value,
            total_paid,
            remaining_balance,
            status: Self::derive_sale_status(total_value, total_paid, remaining_balance),
            installment_breakdown,
        }
    }

    /// Group installments by `(sale_number, client_document)`, preserving
    /// first-seen order of sales and fetch order of installments within
    /// each sale
    pub fn group_sales(installments: &[Installment]) -> Vec<SaleGroup> {
        let mut groups: Vec<SaleGroup> = Vec::new();

        for installment in installments {
            let existing = groups.iter_mut().find(|g| {
                g.sale_number == installment.sale_number
                    && g.client_document == installment.client_document
            });

            match existing {
                Some(group) => group.installments.push(installment.clone()),
                None => groups.push(SaleGroup {
                    sale_number: installment.sale_number.clone(),
                    client_document: installment.client_document.clone(),
                    installments: vec![installment.clone()],
                }),
            }
        }

        debug!(
            installments = installments.len(),
            sales = groups.len(),
            "Grouped installments into sales"
        );

        groups
    }

    fn derive_sale_status(
        total_value: Decimal,
        total_paid: Decimal,
        remaining_balance: Decimal,
    ) -> SaleStatus {
        // An empty sale has nothing outstanding but has received nothing
        // either; it reads as pending, not fully paid.
        if total_value == Decimal::ZERO && total_paid == Decimal::ZERO {
            return SaleStatus::Pending;
        }

        if remaining_balance <= money::epsilon() {
            SaleStatus::FullyPaid
        } else if total_paid > Decimal::ZERO {
            SaleStatus::PartiallyPaid
        } else {
            SaleStatus::Pending
        }
    }
}
