// PaymentRecord persistence
//
// Records are append-only: one insert per confirmed distribution, details in
// a child table keyed by apply position, no update path.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::Result;
use crate::modules::payments::models::{DistributionDetail, PaymentRecord};

/// Append-only store for payment audit records
#[async_trait]
pub trait PaymentRecordRepository: Send + Sync {
    /// Insert one record with its distribution details
    async fn insert(&self, record: &PaymentRecord) -> Result<()>;

    /// Payment history for a client, most recent first
    async fn find_by_client(&self, client_document: &str) -> Result<Vec<PaymentRecord>>;
}

/// Postgres-backed payment record repository
pub struct PgPaymentRecordRepository {
    pool: PgPool,
}

impl PgPaymentRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRecordRepository for PgPaymentRecordRepository {
    async fn insert(&self, record: &PaymentRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO payment_records (
                id, sale_number, client_document, payment_amount,
                payment_date, payment_method, notes, collector_id, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&record.id)
        .bind(&record.sale_number)
        .bind(&record.client_document)
        .bind(record.payment_amount)
        .bind(record.payment_date)
        .bind(&record.payment_method)
        .bind(&record.notes)
        .bind(&record.collector_id)
        .bind(record.created_at)
        .execute(tx.as_mut())
        .await?;

        for (position, detail) in record.distribution_details.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO payment_distribution_details (
                    payment_id, position, installment_id,
                    original_amount, applied_amount, installment_status
                ) VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&record.id)
            .bind(position as i32)
            .bind(&detail.installment_id)
            .bind(detail.original_amount)
            .bind(detail.applied_amount)
            .bind(detail.installment_status.as_str())
            .execute(tx.as_mut())
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn find_by_client(&self, client_document: &str) -> Result<Vec<PaymentRecord>> {
        let mut records = sqlx::query_as::<_, PaymentRecord>(
            r#"
            SELECT
                id, sale_number, client_document, payment_amount,
                payment_date, payment_method, notes, collector_id, created_at
            FROM payment_records
            WHERE client_document = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(client_document)
        .fetch_all(&self.pool)
        .await?;

        for record in &mut records {
            record.distribution_details = sqlx::query_as::<_, DistributionDetail>(
                r#"
                SELECT installment_id, original_amount, applied_amount, installment_status
                FROM payment_distribution_details
                WHERE payment_id = $1
                ORDER BY position ASC
                "#,
            )
            .bind(&record.id)
            .fetch_all(&self.pool)
            .await?;
        }

        Ok(records)
    }
}
