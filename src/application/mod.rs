//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (webhook ingestion, verification) write through the
//! ledger; the query handler reads through the entitlement store.

pub mod handlers;

pub use handlers::{
    EntitlementView, GetEntitlementHandler, GetEntitlementQuery, IngestWebhookCommand,
    IngestWebhookHandler, ReconcileOutcome, SignalReconciler, VerifyCheckoutCommand,
    VerifyCheckoutHandler, VerifyCheckoutResult, WebhookAck,
};
