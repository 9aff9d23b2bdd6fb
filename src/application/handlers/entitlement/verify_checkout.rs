//! VerifyCheckoutHandler - Command handler for client-triggered verification.
//!
//! Called by the client right after the checkout redirect. The provider is
//! queried before any ledger transaction is opened, so no lock is held across
//! the remote call.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::entitlement::{is_valid_session_id, EntitlementState, SignalSource, VerifyError};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{CheckoutSessionProvider, ProviderErrorCode};

use super::reconcile::SignalReconciler;

/// Command to verify a checkout session for the authenticated user.
#[derive(Debug, Clone)]
pub struct VerifyCheckoutCommand {
    pub user_id: UserId,
    pub session_id: String,
}

/// Result of verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifyCheckoutResult {
    /// The user is Pro after reconciliation.
    pub granted: bool,
    pub state: EntitlementState,
}

pub struct VerifyCheckoutHandler {
    provider: Arc<dyn CheckoutSessionProvider>,
    reconciler: SignalReconciler,
}

impl VerifyCheckoutHandler {
    pub fn new(provider: Arc<dyn CheckoutSessionProvider>, reconciler: SignalReconciler) -> Self {
        Self {
            provider,
            reconciler,
        }
    }

    pub async fn handle(&self, cmd: VerifyCheckoutCommand) -> Result<VerifyCheckoutResult, VerifyError> {
        let session_id = cmd.session_id.trim();
        if !is_valid_session_id(session_id) {
            return Err(VerifyError::InvalidSessionId(
                "expected a non-empty provider session id".to_string(),
            ));
        }

        let session = self
            .provider
            .fetch_session(session_id)
            .await
            .map_err(|e| match e.code {
                ProviderErrorCode::NotFound => VerifyError::SessionNotFound,
                _ if e.is_retryable() => {
                    tracing::warn!(session_id, error = %e, "Checkout session lookup failed");
                    VerifyError::ProviderUnavailable(e.message)
                }
                _ => {
                    tracing::error!(session_id, error = %e, "Checkout session lookup rejected");
                    VerifyError::ProviderRejected(e.message)
                }
            })?;

        if session.user_reference() != Some(cmd.user_id.as_str()) {
            tracing::warn!(
                session_id,
                user_id = %cmd.user_id,
                "Checkout session does not belong to caller"
            );
            return Err(VerifyError::SessionNotFound);
        }

        let signal = session
            .to_signal(SignalSource::Verify, Timestamp::now())
            .map_err(|e| {
                tracing::error!(session_id, error = %e, "Provider returned incomplete session");
                VerifyError::ProviderRejected(e.to_string())
            })?;

        let outcome = self.reconciler.reconcile(&signal).await.map_err(|e| {
            tracing::error!(
                idempotency_key = %signal.idempotency_key,
                error = %e,
                "Ledger unavailable during verification"
            );
            VerifyError::LedgerUnavailable(e.to_string())
        })?;

        let state = outcome.state();
        Ok(VerifyCheckoutResult {
            granted: state.is_pro(),
            state,
        })
    }
}
