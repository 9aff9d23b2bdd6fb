//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Ledger Ports
//!
//! - `EntitlementLedger` - Opens claim-and-apply transactions
//! - `LedgerTransaction` - One atomic reconciliation unit of work
//! - `EntitlementStore` - Read-only entitlement lookups
//!
//! ## Provider Ports
//!
//! - `CheckoutSessionProvider` - Direct checkout session lookups
//! - `SessionValidator` - Bearer token validation

mod checkout_session_provider;
mod entitlement_ledger;
mod entitlement_store;
mod session_validator;

pub use checkout_session_provider::{CheckoutSessionProvider, ProviderError, ProviderErrorCode};
pub use entitlement_ledger::{ClaimResult, EntitlementLedger, LedgerTransaction};
pub use entitlement_store::EntitlementStore;
pub use session_validator::SessionValidator;
