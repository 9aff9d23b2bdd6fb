//! PostgreSQL adapters for the entitlement ledger.
//!
//! - `PostgresEntitlementLedger` - claim-and-apply transactions
//! - `PostgresEntitlementStore` - read-only entitlement lookups
//!
//! Schema lives in `migrations/`.

mod entitlement_ledger;
mod entitlement_store;
mod rows;

pub use entitlement_ledger::{PostgresEntitlementLedger, PostgresLedgerTransaction};
pub use entitlement_store::PostgresEntitlementStore;
