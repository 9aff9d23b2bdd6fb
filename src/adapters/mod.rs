//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - bearer token validation (JWT, mock)
//! - `http` - axum routes and middleware
//! - `memory` - in-memory ledger and store
//! - `postgres` - PostgreSQL ledger and store
//! - `stripe` - checkout session lookups

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use auth::{JwtSessionValidator, MockSessionValidator};
pub use memory::InMemoryEntitlementLedger;
pub use postgres::{PostgresEntitlementLedger, PostgresEntitlementStore};
pub use stripe::{MockCheckoutProvider, StripeCheckoutClient, StripeConfig};
