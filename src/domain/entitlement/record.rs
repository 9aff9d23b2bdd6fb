//! Persistent records owned by the reconciliation engine.

use serde::Serialize;

use crate::domain::foundation::{IdempotencyKey, Timestamp, UserId};

use super::{EntitlementState, PaymentSignal, ProviderStatus, SignalSource, Transition};

/// A user's current entitlement.
///
/// Mutated only through [`EntitlementRecord::apply`] with the output of the
/// transition function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementRecord {
    pub user_id: UserId,
    pub state: EntitlementState,
    pub provider_customer_id: Option<String>,
    pub pro_since: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl EntitlementRecord {
    /// The record every account starts with.
    pub fn free(user_id: UserId) -> Self {
        Self {
            user_id,
            state: EntitlementState::Free,
            provider_customer_id: None,
            pro_since: None,
            updated_at: Timestamp::now(),
        }
    }

    /// Applies a committed transition produced for `signal`.
    ///
    /// Returns `true` if any field changed.
    pub fn apply(&mut self, transition: &Transition, signal: &PaymentSignal) -> bool {
        if !transition.should_commit() {
            return false;
        }

        let mut changed = false;

        if transition.changes_state() {
            self.state = transition.to;
            if self.pro_since.is_none() {
                self.pro_since = Some(signal.occurred_at);
            }
            changed = true;
        }

        if self.provider_customer_id.is_none() {
            if let Some(customer) = &signal.provider_customer_id {
                self.provider_customer_id = Some(customer.clone());
                changed = true;
            }
        }

        if changed {
            self.updated_at = Timestamp::now();
        }
        changed
    }
}

/// One row of the idempotency ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub idempotency_key: IdempotencyKey,
    pub user_id: UserId,
    pub source: SignalSource,
    pub processed_at: Timestamp,
    /// Set by `record_outcome` inside the claiming transaction.
    pub resulting_state: Option<EntitlementState>,
}

impl LedgerEntry {
    pub fn claim(signal: &PaymentSignal) -> Self {
        Self {
            idempotency_key: signal.idempotency_key.clone(),
            user_id: signal.user_id.clone(),
            source: signal.source,
            processed_at: Timestamp::now(),
            resulting_state: None,
        }
    }
}

/// Append-only audit row written alongside the ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentLogRecord {
    pub idempotency_key: IdempotencyKey,
    pub user_id: UserId,
    pub amount_minor_units: i64,
    pub currency: String,
    pub provider_status: ProviderStatus,
    pub source: SignalSource,
    pub created_at: Timestamp,
}

impl From<&PaymentSignal> for PaymentLogRecord {
    fn from(signal: &PaymentSignal) -> Self {
        Self {
            idempotency_key: signal.idempotency_key.clone(),
            user_id: signal.user_id.clone(),
            amount_minor_units: signal.amount_minor_units,
            currency: signal.currency.clone(),
            provider_status: signal.provider_status.clone(),
            source: signal.source,
            created_at: Timestamp::now(),
        }
    }
}
