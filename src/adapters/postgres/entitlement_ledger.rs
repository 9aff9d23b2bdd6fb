//! PostgreSQL implementation of EntitlementLedger.
//!
//! Each `LedgerTransaction` wraps one `sqlx::Transaction`. The claim is an
//! `INSERT ... ON CONFLICT DO NOTHING` on the ledger primary key; a second
//! claimant of the same key blocks on the first until it commits or rolls
//! back. Entitlement rows are locked with `SELECT ... FOR UPDATE`.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::entitlement::{EntitlementRecord, EntitlementState, LedgerEntry, PaymentLogRecord};
use crate::domain::foundation::{DomainError, ErrorCode, IdempotencyKey, UserId};
use crate::ports::{ClaimResult, EntitlementLedger, LedgerTransaction};

use super::rows::EntitlementRow;

pub struct PostgresEntitlementLedger {
    pool: PgPool,
}

impl PostgresEntitlementLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementLedger for PostgresEntitlementLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to start transaction: {}", e)))?;

        Ok(Box::new(PostgresLedgerTransaction { tx }))
    }
}

/// Open ledger transaction. Rolled back by sqlx on drop unless committed.
pub struct PostgresLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTransaction for PostgresLedgerTransaction {
    async fn try_claim(&mut self, entry: &LedgerEntry) -> Result<ClaimResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO idempotency_ledger (idempotency_key, user_id, source, processed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (idempotency_key) DO NOTHING
            "#,
        )
        .bind(entry.idempotency_key.as_str())
        .bind(entry.user_id.as_str())
        .bind(entry.source.as_str())
        .bind(entry.processed_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to claim key: {}", e)))?;

        Ok(if result.rows_affected() == 1 {
            ClaimResult::Claimed
        } else {
            ClaimResult::AlreadyClaimed
        })
    }

    async fn lock_entitlement(&mut self, user_id: &UserId) -> Result<EntitlementRecord, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO entitlements (user_id, state)
            VALUES ($1, 'free')
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to provision entitlement: {}", e)))?;

        let row: EntitlementRow = sqlx::query_as(
            r#"
            SELECT user_id, state, provider_customer_id, pro_since, updated_at
            FROM entitlements
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to lock entitlement: {}", e)))?;

        EntitlementRecord::try_from(row)
    }

    async fn save_entitlement(&mut self, record: &EntitlementRecord) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE entitlements
            SET state = $2, provider_customer_id = $3, pro_since = $4, updated_at = $5
            WHERE user_id = $1
            "#,
        )
        .bind(record.user_id.as_str())
        .bind(record.state.as_str())
        .bind(record.provider_customer_id.as_deref())
        .bind(record.pro_since.as_ref().map(|t| *t.as_datetime()))
        .bind(record.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save entitlement: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::EntitlementNotFound,
                format!("No entitlement row for {}", record.user_id),
            ));
        }

        Ok(())
    }

    async fn append_payment_log(&mut self, record: &PaymentLogRecord) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payment_log (
                idempotency_key, user_id, amount_minor_units, currency,
                provider_status, source, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.idempotency_key.as_str())
        .bind(record.user_id.as_str())
        .bind(record.amount_minor_units)
        .bind(&record.currency)
        .bind(record.provider_status.as_str())
        .bind(record.source.as_str())
        .bind(record.created_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to append payment log: {}", e)))?;

        Ok(())
    }

    async fn record_outcome(
        &mut self,
        key: &IdempotencyKey,
        state: EntitlementState,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE idempotency_ledger
            SET resulting_state = $2
            WHERE idempotency_key = $1
            "#,
        )
        .bind(key.as_str())
        .bind(state.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to record outcome: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::LedgerEntryNotFound,
                format!("Ledger entry {} not claimed", key),
            ));
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit transaction: {}", e)))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DomainError::database(format!("Failed to roll back transaction: {}", e)))
    }
}
