//! EntitlementLedger port - atomic claim-and-apply for payment signals.
//!
//! Every signal is reconciled inside one ledger transaction:
//!
//! 1. `try_claim` inserts the idempotency key (first writer wins)
//! 2. `lock_entitlement` reads the user's record, serializing writers per user
//! 3. `save_entitlement`, `append_payment_log`, `record_outcome`
//! 4. `commit`
//!
//! Dropping a transaction without committing rolls it back, releasing the
//! claim and leaving no ledger or log rows behind.

use async_trait::async_trait;

use crate::domain::entitlement::{EntitlementRecord, EntitlementState, LedgerEntry, PaymentLogRecord};
use crate::domain::foundation::{DomainError, IdempotencyKey, UserId};

/// Result of claiming an idempotency key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimResult {
    /// This transaction owns the key.
    Claimed,
    /// Another transaction already committed the key.
    AlreadyClaimed,
}

impl ClaimResult {
    pub fn is_claimed(&self) -> bool {
        matches!(self, ClaimResult::Claimed)
    }
}

/// Opens ledger transactions.
#[async_trait]
pub trait EntitlementLedger: Send + Sync {
    /// Begins a new transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the store is unreachable.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, DomainError>;
}

/// One unit of work against the ledger and the entitlement store.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Attempts to insert the ledger entry.
    ///
    /// Concurrent claims of the same key block until the first transaction
    /// finishes; the loser then sees `AlreadyClaimed` if the winner committed.
    async fn try_claim(&mut self, entry: &LedgerEntry) -> Result<ClaimResult, DomainError>;

    /// Returns the user's record, creating a Free record if none exists, and
    /// holds a write lock on it until the transaction ends.
    async fn lock_entitlement(&mut self, user_id: &UserId) -> Result<EntitlementRecord, DomainError>;

    /// Persists the record. Must follow `lock_entitlement` for the same user.
    async fn save_entitlement(&mut self, record: &EntitlementRecord) -> Result<(), DomainError>;

    async fn append_payment_log(&mut self, record: &PaymentLogRecord) -> Result<(), DomainError>;

    /// Stores the resulting state on the claimed ledger entry.
    async fn record_outcome(
        &mut self,
        key: &IdempotencyKey,
        state: EntitlementState,
    ) -> Result<(), DomainError>;

    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}
