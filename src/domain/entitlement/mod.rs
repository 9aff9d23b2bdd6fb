//! Entitlement reconciliation domain.
//!
//! Payment signals from webhooks and client verification are normalized into
//! [`PaymentSignal`]s and folded into a user's [`EntitlementState`] by the
//! pure [`transition`] function.

mod checkout_session;
mod provider_event;
mod provider_status;
mod record;
pub(crate) mod signal;
mod state;
mod transition;
mod verify_errors;
mod webhook_errors;
mod webhook_verifier;

pub use checkout_session::{
    is_valid_session_id, CheckoutSession, SignalError, USER_ID_METADATA_KEY,
};
pub use provider_event::{ProviderEvent, ProviderEventData, ProviderEventType};
pub use provider_status::ProviderStatus;
pub use record::{EntitlementRecord, LedgerEntry, PaymentLogRecord};
pub use signal::{PaymentSignal, SignalSource};
pub use state::EntitlementState;
pub use transition::{transition, Transition, TransitionEffect};
pub use verify_errors::VerifyError;
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, WebhookVerifier, DEFAULT_TOLERANCE_SECS};

#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
