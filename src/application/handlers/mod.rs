//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod entitlement;

pub use entitlement::{
    EntitlementView, GetEntitlementHandler, GetEntitlementQuery, IngestWebhookCommand,
    IngestWebhookHandler, ReconcileOutcome, SignalReconciler, VerifyCheckoutCommand,
    VerifyCheckoutHandler, VerifyCheckoutResult, WebhookAck,
};
