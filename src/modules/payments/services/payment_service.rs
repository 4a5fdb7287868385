use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::core::{AppError, Result};
use crate::modules::distribution::models::{DistributionMode, DistributionPreview};
use crate::modules::distribution::services::{DistributionEngine, ReconciliationApplier};
use crate::modules::installments::models::InstallmentUpdate;
use crate::modules::installments::repositories::InstallmentRepository;
use crate::modules::installments::services::BalanceCalculator;
use crate::modules::payments::models::{
    FailedUpdate, PaymentInput, PaymentRecord, PersistenceReport,
};
use crate::modules::payments::repositories::PaymentRecordRepository;

/// Outcome of recording one payment
///
/// The record and updates are the computed values regardless of what the
/// gateway accepted; the report says what actually landed.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub record: PaymentRecord,
    pub updates: Vec<InstallmentUpdate>,
    pub unapplied_remainder: Decimal,
    pub report: PersistenceReport,
}

/// Online payment pipeline: fetch fresh state, compute the distribution,
/// expand it to installment updates, and persist
pub struct PaymentService {
    installments: Arc<dyn InstallmentRepository>,
    payments: Arc<dyn PaymentRecordRepository>,
}

impl PaymentService {
    pub fn new(
        installments: Arc<dyn InstallmentRepository>,
        payments: Arc<dyn PaymentRecordRepository>,
    ) -> Self {
        Self {
            installments,
            payments,
        }
    }

    /// Compute a distribution preview against current installment state,
    /// without persisting anything
    ///
    /// Called again from scratch whenever the amount or mode changes, so
    /// the preview always reflects the latest balances.
    pub async fn preview_payment(
        &self,
        client_document: &str,
        amount: Decimal,
        mode: DistributionMode,
        manual_overrides: Option<&HashMap<String, Decimal>>,
    ) -> Result<DistributionPreview> {
        if amount <= Decimal::ZERO {
            return Err(AppError::validation("Payment amount must be positive"));
        }

        let installments = self.installments.fetch_by_client(client_document).await?;
        if installments.is_empty() {
            return Err(AppError::validation(format!(
                "Client {} has no installments to distribute against",
                client_document
            )));
        }

        let sales = BalanceCalculator::group_sales(&installments);
        DistributionEngine::compute(&sales, amount, mode, manual_overrides)
    }

    /// Record one payment: compute the distribution against fresh state and
    /// persist the resulting updates and audit record
    ///
    /// Updates are applied in computed order with per-item outcome capture
    /// and no automatic rollback; the audit record is inserted only when at
    /// least one installment update landed.
    pub async fn record_payment(&self, input: &PaymentInput) -> Result<PaymentOutcome> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::validation("Payment amount must be positive"));
        }

        let installments = self
            .installments
            .fetch_by_client(&input.client_document)
            .await?;
        if installments.is_empty() {
            return Err(AppError::validation(format!(
                "Client {} has no installments to distribute against",
                input.client_document
            )));
        }

        let sales = BalanceCalculator::group_sales(&installments);
        let preview = DistributionEngine::compute(
            &sales,
            input.amount,
            input.mode,
            input.manual_overrides.as_ref(),
        )?;

        if preview.requires_confirmation() && !input.confirm_mismatch {
            return Err(AppError::DistributionMismatch {
                amount: preview.amount,
                total_distributed: preview.total_distributed,
            });
        }

        let result = ReconciliationApplier::apply(&sales, &preview, input)?;

        info!(
            client_document = %input.client_document,
            amount = %input.amount,
            mode = %input.mode,
            installments_touched = result.installment_updates.len(),
            "Applying payment distribution"
        );

        let mut report = PersistenceReport::default();

        for update in &result.installment_updates {
            match self
                .installments
                .apply_update(update, input.payment_date)
                .await
            {
                Ok(()) => report.applied.push(update.installment_id.clone()),
                Err(err) => {
                    warn!(
                        installment_id = %update.installment_id,
                        error = %err,
                        "Installment update failed, continuing with remaining updates"
                    );
                    report.failed.push(FailedUpdate {
                        installment_id: update.installment_id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        let all_updates_failed =
            !result.installment_updates.is_empty() && report.applied.is_empty();
        if all_updates_failed {
            // No audit record without at least one persisted update.
            report.record_persisted = false;
            report.record_error = Some("skipped: no installment update persisted".to_string());
        } else {
            match self.payments.insert(&result.payment_record).await {
                Ok(()) => report.record_persisted = true,
                Err(err) => {
                    warn!(
                        payment_id = %result.payment_record.id,
                        error = %err,
                        "Payment record insert failed"
                    );
                    report.record_persisted = false;
                    report.record_error = Some(err.to_string());
                }
            }
        }

        if result.unapplied_remainder > Decimal::ZERO {
            warn!(
                client_document = %input.client_document,
                unapplied = %result.unapplied_remainder,
                "Part of the payment could not be applied to any installment"
            );
        }

        Ok(PaymentOutcome {
            record: result.payment_record,
            updates: result.installment_updates,
            unapplied_remainder: result.unapplied_remainder,
            report,
        })
    }

    /// Payment history for a client, most recent first
    pub async fn payment_history(&self, client_document: &str) -> Result<Vec<PaymentRecord>> {
        self.payments.find_by_client(client_document).await
    }
}
