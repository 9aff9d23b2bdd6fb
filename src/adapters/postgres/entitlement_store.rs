//! PostgreSQL implementation of EntitlementStore.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entitlement::EntitlementRecord;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::EntitlementStore;

use super::rows::EntitlementRow;

/// Reads entitlement records outside of ledger transactions.
pub struct PostgresEntitlementStore {
    pool: PgPool,
}

impl PostgresEntitlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntitlementStore for PostgresEntitlementStore {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<EntitlementRecord>, DomainError> {
        let row: Option<EntitlementRow> = sqlx::query_as(
            r#"
            SELECT user_id, state, provider_customer_id, pro_since, updated_at
            FROM entitlements
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch entitlement: {}", e)))?;

        row.map(EntitlementRecord::try_from).transpose()
    }
}
