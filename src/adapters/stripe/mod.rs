//! Stripe adapters.
//!
//! - `StripeCheckoutClient` - retrieves checkout sessions over the Stripe API
//! - `MockCheckoutProvider` - in-memory sessions for tests
//!
//! Webhook signature verification lives in the domain (`WebhookVerifier`)
//! since it needs only the signing secret and no network access.

mod checkout_client;
mod mock_checkout_provider;

pub use checkout_client::{StripeCheckoutClient, StripeConfig};
pub use mock_checkout_provider::MockCheckoutProvider;
