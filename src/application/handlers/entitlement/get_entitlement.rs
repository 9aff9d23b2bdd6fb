//! GetEntitlementHandler - Query handler for the caller's entitlement.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entitlement::{EntitlementRecord, EntitlementState};
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::EntitlementStore;

/// Query to get a user's entitlement.
#[derive(Debug, Clone)]
pub struct GetEntitlementQuery {
    pub user_id: UserId,
}

/// Read model for a user's entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementView {
    pub user_id: UserId,
    pub state: EntitlementState,
    pub is_pro: bool,
    pub pro_since: Option<Timestamp>,
    pub provider_customer_id: Option<String>,
}

impl From<EntitlementRecord> for EntitlementView {
    fn from(record: EntitlementRecord) -> Self {
        Self {
            is_pro: record.state.is_pro(),
            user_id: record.user_id,
            state: record.state,
            pro_since: record.pro_since,
            provider_customer_id: record.provider_customer_id,
        }
    }
}

/// Users with no record read as Free.
pub struct GetEntitlementHandler {
    store: Arc<dyn EntitlementStore>,
}

impl GetEntitlementHandler {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetEntitlementQuery) -> Result<EntitlementView, DomainError> {
        let record = self
            .store
            .find_by_user(&query.user_id)
            .await?
            .unwrap_or_else(|| EntitlementRecord::free(query.user_id));

        Ok(record.into())
    }
}
