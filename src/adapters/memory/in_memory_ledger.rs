//! In-memory entitlement ledger for tests and local development.
//!
//! A transaction holds the store-wide lock from `begin` until it commits or
//! is dropped, so transactions are fully serialized. Writes are staged and
//! applied only on `commit`; dropping an uncommitted transaction discards
//! them, matching the rollback semantics of the PostgreSQL adapter.
//!
//! # Example
//!
//! ```ignore
//! let ledger = Arc::new(InMemoryEntitlementLedger::new());
//! // ... reconcile signals ...
//! assert_eq!(ledger.ledger_entries().await.len(), 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::entitlement::{EntitlementRecord, EntitlementState, LedgerEntry, PaymentLogRecord};
use crate::domain::foundation::{DomainError, ErrorCode, IdempotencyKey, UserId};
use crate::ports::{ClaimResult, EntitlementLedger, EntitlementStore, LedgerTransaction};

#[derive(Debug, Default)]
struct MemoryState {
    entitlements: HashMap<UserId, EntitlementRecord>,
    ledger: BTreeMap<IdempotencyKey, LedgerEntry>,
    payment_log: Vec<PaymentLogRecord>,
}

/// Failure switches shared with open transactions.
#[derive(Debug, Default)]
struct Faults {
    unavailable: AtomicBool,
    fail_next_commit: AtomicBool,
}

/// In-memory `EntitlementLedger` and `EntitlementStore`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEntitlementLedger {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl InMemoryEntitlementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Inserts or replaces a committed entitlement record.
    pub async fn seed(&self, record: EntitlementRecord) {
        self.state
            .lock()
            .await
            .entitlements
            .insert(record.user_id.clone(), record);
    }

    /// Makes every operation fail with a database error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes the next `commit` fail after all writes were staged.
    pub fn fail_next_commit(&self) {
        self.faults.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Committed ledger entries ordered by key.
    pub async fn ledger_entries(&self) -> Vec<LedgerEntry> {
        self.state.lock().await.ledger.values().cloned().collect()
    }

    /// Committed payment log rows in insertion order.
    pub async fn payment_log(&self) -> Vec<PaymentLogRecord> {
        self.state.lock().await.payment_log.clone()
    }

    pub async fn entitlement(&self, user_id: &UserId) -> Option<EntitlementRecord> {
        self.state.lock().await.entitlements.get(user_id).cloned()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        check_available(&self.faults)
    }
}

fn check_available(faults: &Faults) -> Result<(), DomainError> {
    if faults.unavailable.load(Ordering::SeqCst) {
        return Err(DomainError::database("ledger unavailable"));
    }
    Ok(())
}

#[async_trait]
impl EntitlementLedger for InMemoryEntitlementLedger {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, DomainError> {
        self.check_available()?;
        let guard = self.state.clone().lock_owned().await;

        Ok(Box::new(InMemoryLedgerTransaction {
            guard,
            faults: Arc::clone(&self.faults),
            claimed: None,
            locked: None,
            payment_log: Vec::new(),
        }))
    }
}

#[async_trait]
impl EntitlementStore for InMemoryEntitlementLedger {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<EntitlementRecord>, DomainError> {
        self.check_available()?;
        Ok(self.state.lock().await.entitlements.get(user_id).cloned())
    }
}

/// Transaction over the in-memory store. Holds the store lock while alive.
pub struct InMemoryLedgerTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    faults: Arc<Faults>,
    claimed: Option<LedgerEntry>,
    locked: Option<EntitlementRecord>,
    payment_log: Vec<PaymentLogRecord>,
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    async fn try_claim(&mut self, entry: &LedgerEntry) -> Result<ClaimResult, DomainError> {
        check_available(&self.faults)?;

        let taken = self.guard.ledger.contains_key(&entry.idempotency_key)
            || self
                .claimed
                .as_ref()
                .is_some_and(|c| c.idempotency_key == entry.idempotency_key);
        if taken {
            return Ok(ClaimResult::AlreadyClaimed);
        }

        self.claimed = Some(entry.clone());
        Ok(ClaimResult::Claimed)
    }

    async fn lock_entitlement(&mut self, user_id: &UserId) -> Result<EntitlementRecord, DomainError> {
        check_available(&self.faults)?;

        if let Some(locked) = &self.locked {
            if &locked.user_id == user_id {
                return Ok(locked.clone());
            }
        }

        let record = self
            .guard
            .entitlements
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| EntitlementRecord::free(user_id.clone()));
        self.locked = Some(record.clone());
        Ok(record)
    }

    async fn save_entitlement(&mut self, record: &EntitlementRecord) -> Result<(), DomainError> {
        check_available(&self.faults)?;

        match &self.locked {
            Some(locked) if locked.user_id == record.user_id => {
                self.locked = Some(record.clone());
                Ok(())
            }
            _ => Err(DomainError::new(
                ErrorCode::EntitlementNotFound,
                format!("Entitlement for {} was not locked", record.user_id),
            )),
        }
    }

    async fn append_payment_log(&mut self, record: &PaymentLogRecord) -> Result<(), DomainError> {
        check_available(&self.faults)?;

        let duplicate = self
            .guard
            .payment_log
            .iter()
            .chain(self.payment_log.iter())
            .any(|r| r.idempotency_key == record.idempotency_key);
        if duplicate {
            return Err(DomainError::database(format!(
                "Duplicate payment log for {}",
                record.idempotency_key
            )));
        }

        self.payment_log.push(record.clone());
        Ok(())
    }

    async fn record_outcome(
        &mut self,
        key: &IdempotencyKey,
        state: EntitlementState,
    ) -> Result<(), DomainError> {
        check_available(&self.faults)?;

        match self.claimed.as_mut() {
            Some(entry) if &entry.idempotency_key == key => {
                entry.resulting_state = Some(state);
                Ok(())
            }
            _ => Err(DomainError::new(
                ErrorCode::LedgerEntryNotFound,
                format!("Ledger entry {} not claimed", key),
            )),
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        check_available(&self.faults)?;
        if self.faults.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(DomainError::database("commit failed"));
        }

        let InMemoryLedgerTransaction {
            mut guard,
            claimed,
            locked,
            payment_log,
            ..
        } = *self;

        if let Some(entry) = claimed {
            guard.ledger.insert(entry.idempotency_key.clone(), entry);
        }
        if let Some(record) = locked {
            guard.entitlements.insert(record.user_id.clone(), record);
        }
        guard.payment_log.extend(payment_log);

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}
