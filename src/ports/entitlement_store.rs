//! EntitlementStore port - read access to entitlement records.

use async_trait::async_trait;

use crate::domain::entitlement::EntitlementRecord;
use crate::domain::foundation::{DomainError, UserId};

/// Read-only access to entitlement records outside a ledger transaction.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Returns the user's record, or `None` if the user never had one.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<EntitlementRecord>, DomainError>;
}
