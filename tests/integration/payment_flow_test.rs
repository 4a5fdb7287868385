// Integration tests for the online payment pipeline, exercised against
// in-memory implementations of the persistence traits

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use collectra::core::{AppError, Result};
use collectra::distribution::models::DistributionMode;
use collectra::installments::models::{Installment, InstallmentStatus, InstallmentUpdate};
use collectra::installments::repositories::InstallmentRepository;
use collectra::payments::models::{PaymentInput, PaymentRecord};
use collectra::payments::repositories::PaymentRecordRepository;
use collectra::payments::services::PaymentService;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;

/// In-memory installment store; updates mutate rows like the real gateway
struct MemoryInstallmentRepository {
    rows: Mutex<Vec<Installment>>,
    /// Installment ids whose updates are rejected, to exercise partial
    /// failure reporting
    failing_ids: HashSet<String>,
}

impl MemoryInstallmentRepository {
    fn new(rows: Vec<Installment>) -> Self {
        Self {
            rows: Mutex::new(rows),
            failing_ids: HashSet::new(),
        }
    }

    fn failing_on(rows: Vec<Installment>, failing_ids: HashSet<String>) -> Self {
        Self {
            rows: Mutex::new(rows),
            failing_ids,
        }
    }

    async fn row(&self, id: &str) -> Installment {
        self.rows
            .lock()
            .await
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .expect("installment must exist")
    }
}

#[async_trait]
impl InstallmentRepository for MemoryInstallmentRepository {
    async fn fetch_by_client(&self, client_document: &str) -> Result<Vec<Installment>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|i| i.client_document == client_document)
            .cloned()
            .collect())
    }

    async fn apply_update(
        &self,
        update: &InstallmentUpdate,
        received_date: NaiveDate,
    ) -> Result<()> {
        if self.failing_ids.contains(&update.installment_id) {
            return Err(AppError::persistence("simulated gateway failure"));
        }

        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|i| i.id == update.installment_id)
            .ok_or_else(|| AppError::not_found("installment"))?;

        row.received_amount = update.new_received;
        row.status = update.new_status;
        row.received_date = Some(received_date);

        Ok(())
    }
}

#[derive(Default)]
struct MemoryPaymentRepository {
    records: Mutex<Vec<PaymentRecord>>,
}

#[async_trait]
impl PaymentRecordRepository for MemoryPaymentRepository {
    async fn insert(&self, record: &PaymentRecord) -> Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn find_by_client(&self, client_document: &str) -> Result<Vec<PaymentRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.client_document == client_document)
            .cloned()
            .collect())
    }
}

const CLIENT: &str = "12345678900";

fn installment(sale: &str, original: Decimal, received: Decimal) -> Installment {
    let mut inst = Installment::new(sale.to_string(), CLIENT.to_string(), original).unwrap();
    inst.received_amount = received;
    inst.recompute_status();
    inst
}

fn input(amount: Decimal) -> PaymentInput {
    PaymentInput {
        client_document: CLIENT.to_string(),
        amount,
        mode: DistributionMode::Automatic,
        manual_overrides: None,
        payment_date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
        payment_method: "pix".to_string(),
        notes: Some("weekly visit".to_string()),
        collector_id: "collector-1".to_string(),
        allow_overpayment: false,
        confirm_mismatch: false,
    }
}

fn service(
    installments: Arc<MemoryInstallmentRepository>,
    payments: Arc<MemoryPaymentRepository>,
) -> PaymentService {
    PaymentService::new(installments, payments)
}

#[tokio::test]
async fn test_automatic_payment_settles_smallest_sale_first() {
    let rows = vec![
        installment("S-big", dec!(200), dec!(0)),
        installment("S-small", dec!(50), dec!(0)),
    ];
    let small_id = rows[1].id.clone();
    let installments = Arc::new(MemoryInstallmentRepository::new(rows));
    let payments = Arc::new(MemoryPaymentRepository::default());
    let service = service(installments.clone(), payments.clone());

    let outcome = service.record_payment(&input(dec!(80))).await.unwrap();

    assert_eq!(outcome.updates.len(), 2);
    assert!(!outcome.report.has_failures());
    assert_eq!(outcome.unapplied_remainder, Decimal::ZERO);

    // The small sale settles in full, the big one takes the rest.
    let small = installments.row(&small_id).await;
    assert_eq!(small.received_amount, dec!(50));
    assert_eq!(small.status, InstallmentStatus::Paid);
    assert_eq!(small.received_date, Some(input(dec!(80)).payment_date));

    // The audit record reconciles against the entered amount.
    let history = service.payment_history(CLIENT).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].payment_amount, dec!(80));
    assert!(history[0].reconciles());
    assert_eq!(history[0].sale_number, None);
}

#[tokio::test]
async fn test_single_sale_record_keeps_sale_number() {
    let rows = vec![installment("S-1", dec!(100), dec!(0))];
    let installments = Arc::new(MemoryInstallmentRepository::new(rows));
    let payments = Arc::new(MemoryPaymentRepository::default());
    let service = service(installments, payments.clone());

    service.record_payment(&input(dec!(60))).await.unwrap();

    let records = payments.records.lock().await;
    assert_eq!(records[0].sale_number, Some("S-1".to_string()));
    assert_eq!(records[0].distribution_details.len(), 1);
}

#[tokio::test]
async fn test_non_positive_amount_is_rejected() {
    let installments = Arc::new(MemoryInstallmentRepository::new(vec![installment(
        "S-1",
        dec!(100),
        dec!(0),
    )]));
    let payments = Arc::new(MemoryPaymentRepository::default());
    let service = service(installments, payments);

    for amount in [dec!(0), dec!(-5)] {
        let result = service.record_payment(&input(amount)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

#[tokio::test]
async fn test_client_without_installments_is_rejected() {
    let installments = Arc::new(MemoryInstallmentRepository::new(Vec::new()));
    let payments = Arc::new(MemoryPaymentRepository::default());
    let service = service(installments, payments);

    let result = service.record_payment(&input(dec!(50))).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_mismatch_requires_explicit_confirmation() {
    // Total debt 30, payment 100: 70 cannot be distributed.
    let installments = Arc::new(MemoryInstallmentRepository::new(vec![installment(
        "S-1",
        dec!(30),
        dec!(0),
    )]));
    let payments = Arc::new(MemoryPaymentRepository::default());
    let service = service(installments, payments.clone());

    let unconfirmed = service.record_payment(&input(dec!(100))).await;
    assert!(matches!(
        unconfirmed,
        Err(AppError::DistributionMismatch { .. })
    ));
    assert!(payments.records.lock().await.is_empty());

    let mut confirmed = input(dec!(100));
    confirmed.confirm_mismatch = true;
    let outcome = service.record_payment(&confirmed).await.unwrap();

    assert_eq!(outcome.unapplied_remainder, dec!(70));
    assert_eq!(outcome.record.distributed_total(), dec!(30));
    assert_eq!(payments.records.lock().await.len(), 1);
}

#[tokio::test]
async fn test_manual_mode_distributes_to_targets() {
    let rows = vec![
        installment("S-1", dec!(100), dec!(20)),
        installment("S-2", dec!(100), dec!(0)),
    ];
    let installments = Arc::new(MemoryInstallmentRepository::new(rows));
    let payments = Arc::new(MemoryPaymentRepository::default());
    let service = service(installments.clone(), payments);

    let mut payment = input(dec!(110));
    payment.mode = DistributionMode::Manual;
    payment.manual_overrides = Some(HashMap::from([
        ("S-1".to_string(), dec!(100)),
        ("S-2".to_string(), dec!(30)),
    ]));

    let outcome = service.record_payment(&payment).await.unwrap();

    assert_eq!(outcome.record.distributed_total(), dec!(110));
    assert!(!outcome.report.has_failures());

    let rows = installments.rows.lock().await;
    let s1 = rows.iter().find(|i| i.sale_number == "S-1").unwrap();
    let s2 = rows.iter().find(|i| i.sale_number == "S-2").unwrap();
    assert_eq!(s1.received_amount, dec!(100));
    assert_eq!(s1.status, InstallmentStatus::Paid);
    assert_eq!(s2.received_amount, dec!(30));
    assert_eq!(s2.status, InstallmentStatus::PartiallyPaid);
}

#[tokio::test]
async fn test_partial_persistence_failure_is_reported_not_rolled_back() {
    let rows = vec![
        installment("S-1", dec!(40), dec!(0)),
        installment("S-2", dec!(100), dec!(0)),
    ];
    let failing_id = rows[0].id.clone();
    let surviving_id = rows[1].id.clone();
    let installments = Arc::new(MemoryInstallmentRepository::failing_on(
        rows,
        HashSet::from([failing_id.clone()]),
    ));
    let payments = Arc::new(MemoryPaymentRepository::default());
    let service = service(installments.clone(), payments.clone());

    let outcome = service.record_payment(&input(dec!(90))).await.unwrap();

    // The failed update is itemized; the other one stays applied.
    assert!(outcome.report.has_failures());
    assert_eq!(outcome.report.failed.len(), 1);
    assert_eq!(outcome.report.failed[0].installment_id, failing_id);
    assert_eq!(outcome.report.applied, vec![surviving_id.clone()]);

    let surviving = installments.row(&surviving_id).await;
    assert_eq!(surviving.received_amount, dec!(50));

    let failed = installments.row(&failing_id).await;
    assert_eq!(failed.received_amount, Decimal::ZERO);

    // The audit record still lands because one update succeeded.
    assert!(outcome.report.record_persisted);
    assert_eq!(payments.records.lock().await.len(), 1);
}

#[tokio::test]
async fn test_preview_does_not_persist() {
    let installments = Arc::new(MemoryInstallmentRepository::new(vec![installment(
        "S-1",
        dec!(100),
        dec!(0),
    )]));
    let payments = Arc::new(MemoryPaymentRepository::default());
    let service = service(installments.clone(), payments.clone());

    let preview = service
        .preview_payment(CLIENT, dec!(45), DistributionMode::Automatic, None)
        .await
        .unwrap();

    assert_eq!(preview.total_distributed, dec!(45));
    assert!(payments.records.lock().await.is_empty());

    let rows = installments.rows.lock().await;
    assert_eq!(rows[0].received_amount, Decimal::ZERO);
}
