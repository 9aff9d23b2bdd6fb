//! HTTP adapter for entitlement endpoints.
//!
//! - `POST /webhooks/stripe` - provider webhook ingestion
//! - `POST /entitlements/verify` - client-triggered checkout verification
//! - `GET /entitlements/me` - current entitlement of the caller

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, HealthResponse, VerifyRequest, WebhookResponse};
pub use handlers::{EntitlementHandlers, SIGNATURE_HEADER};
pub use routes::{entitlement_routes, webhook_routes};
