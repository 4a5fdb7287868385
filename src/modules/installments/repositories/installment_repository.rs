// Installment persistence gateway
//
// The computation pipeline never touches the database directly: it consumes
// fresh installment rows from this repository and hands computed updates
// back to it, one row per touched installment, in the order they were
// computed.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::core::{AppError, Result};
use crate::modules::installments::models::{Installment, InstallmentUpdate};

/// Read/write access to installment rows
#[async_trait]
pub trait InstallmentRepository: Send + Sync {
    /// Fetch all installments for a client, current at call time
    ///
    /// Freshness matters: a distribution must be computed against amounts
    /// read immediately before it, never against cached state.
    async fn fetch_by_client(&self, client_document: &str) -> Result<Vec<Installment>>;

    /// Persist one computed installment update
    async fn apply_update(&self, update: &InstallmentUpdate, received_date: NaiveDate)
        -> Result<()>;
}

/// Postgres-backed installment repository
pub struct PgInstallmentRepository {
    pool: PgPool,
}

impl PgInstallmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstallmentRepository for PgInstallmentRepository {
    async fn fetch_by_client(&self, client_document: &str) -> Result<Vec<Installment>> {
        let installments = sqlx::query_as::<_, Installment>(
            r#"
            SELECT
                id, sale_number, client_document, original_amount,
                received_amount, status, received_date, created_at, updated_at
            FROM installments
            WHERE client_document = $1
            ORDER BY sale_number ASC, created_at ASC, id ASC
            "#,
        )
        .bind(client_document)
        .fetch_all(&self.pool)
        .await?;

        Ok(installments)
    }

    async fn apply_update(
        &self,
        update: &InstallmentUpdate,
        received_date: NaiveDate,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE installments
            SET received_amount = $1,
                status = $2,
                received_date = $3,
                updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(update.new_received)
        .bind(update.new_status.as_str())
        .bind(received_date)
        .bind(&update.installment_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Installment {} not found",
                update.installment_id
            )));
        }

        Ok(())
    }
}
