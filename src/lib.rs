//! Pro Entitlements - payment-driven entitlement reconciliation.
//!
//! Payment signals arrive from two directions: signed provider webhooks and
//! client-triggered checkout verification. Both derive the same idempotency
//! key from the checkout session, claim it in the ledger, and apply the
//! Free → Pro transition at most once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
