//! Entitlement command and query handlers.

mod get_entitlement;
mod ingest_webhook;
mod reconcile;
mod verify_checkout;

pub use get_entitlement::{EntitlementView, GetEntitlementHandler, GetEntitlementQuery};
pub use ingest_webhook::{IngestWebhookCommand, IngestWebhookHandler, WebhookAck};
pub use reconcile::{ReconcileOutcome, SignalReconciler};
pub use verify_checkout::{VerifyCheckoutCommand, VerifyCheckoutHandler, VerifyCheckoutResult};
