//! SignalReconciler - the claim → transition → persist sequence shared by
//! both ingress paths.
//!
//! Every step runs inside one ledger transaction. Nothing is written unless
//! the claim is won, and a claim is never committed without the matching
//! entitlement update and payment log row.

use std::sync::Arc;

use crate::domain::entitlement::{
    transition, EntitlementState, LedgerEntry, PaymentLogRecord, PaymentSignal, TransitionEffect,
};
use crate::domain::foundation::DomainError;
use crate::ports::{ClaimResult, EntitlementLedger, LedgerTransaction};

/// What reconciling one signal did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The claim was won and committed.
    Applied {
        state: EntitlementState,
        /// `Free → Pro` happened in this transaction.
        upgraded: bool,
    },
    /// The key was already committed by an earlier delivery or the other path.
    Duplicate { state: EntitlementState },
    /// No successful payment; the claim was released.
    NotPaid { state: EntitlementState },
}

impl ReconcileOutcome {
    /// The user's entitlement state after reconciliation.
    pub fn state(&self) -> EntitlementState {
        match self {
            ReconcileOutcome::Applied { state, .. }
            | ReconcileOutcome::Duplicate { state }
            | ReconcileOutcome::NotPaid { state } => *state,
        }
    }
}

/// Applies payment signals to entitlements exactly once per idempotency key.
#[derive(Clone)]
pub struct SignalReconciler {
    ledger: Arc<dyn EntitlementLedger>,
}

impl SignalReconciler {
    pub fn new(ledger: Arc<dyn EntitlementLedger>) -> Self {
        Self { ledger }
    }

    /// Reconciles one signal.
    ///
    /// # Errors
    ///
    /// Any ledger failure. The transaction is rolled back, so the signal can
    /// be reconciled again by a later delivery.
    pub async fn reconcile(&self, signal: &PaymentSignal) -> Result<ReconcileOutcome, DomainError> {
        let mut tx = self.ledger.begin().await?;

        if tx.try_claim(&LedgerEntry::claim(signal)).await? == ClaimResult::AlreadyClaimed {
            let record = tx.lock_entitlement(&signal.user_id).await?;
            release(tx).await;
            tracing::info!(
                idempotency_key = %signal.idempotency_key,
                user_id = %signal.user_id,
                source = %signal.source,
                "Claim lost, signal already reconciled"
            );
            return Ok(ReconcileOutcome::Duplicate {
                state: record.state,
            });
        }

        let mut record = tx.lock_entitlement(&signal.user_id).await?;
        let step = transition(record.state, signal);

        if step.effect == TransitionEffect::NoPayment {
            release(tx).await;
            tracing::info!(
                idempotency_key = %signal.idempotency_key,
                user_id = %signal.user_id,
                source = %signal.source,
                provider_status = %signal.provider_status,
                "No successful payment, claim released"
            );
            return Ok(ReconcileOutcome::NotPaid {
                state: record.state,
            });
        }

        record.apply(&step, signal);
        tx.save_entitlement(&record).await?;
        tx.append_payment_log(&PaymentLogRecord::from(signal)).await?;
        tx.record_outcome(&signal.idempotency_key, record.state)
            .await?;
        tx.commit().await?;

        let upgraded = step.changes_state();
        if upgraded {
            tracing::info!(
                idempotency_key = %signal.idempotency_key,
                user_id = %signal.user_id,
                source = %signal.source,
                "Entitlement upgraded to pro"
            );
        } else {
            tracing::info!(
                idempotency_key = %signal.idempotency_key,
                user_id = %signal.user_id,
                source = %signal.source,
                "Payment recorded for user already pro"
            );
        }

        Ok(ReconcileOutcome::Applied {
            state: record.state,
            upgraded,
        })
    }
}

/// Rolls back a transaction whose outcome is already decided.
///
/// A failed rollback is only logged: the store discards uncommitted work
/// when the connection is released.
async fn release(tx: Box<dyn LedgerTransaction>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "Ledger rollback failed");
    }
}
