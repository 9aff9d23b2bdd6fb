//! HTTP routes for entitlement endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::{auth_middleware, AuthState};

use super::handlers::{get_my_entitlement, handle_stripe_webhook, verify_checkout, EntitlementHandlers};

/// Bearer-authenticated routes, mounted under `/entitlements`.
///
/// - `POST /verify` - reconcile a checkout session for the caller
/// - `GET /me` - read the caller's entitlement
pub fn entitlement_routes(handlers: EntitlementHandlers, auth: AuthState) -> Router {
    Router::new()
        .route("/verify", post(verify_checkout))
        .route("/me", get(get_my_entitlement))
        .route_layer(middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(handlers)
}

/// Provider callbacks, mounted under `/webhooks`.
///
/// No bearer auth; deliveries authenticate with their signature header.
pub fn webhook_routes(handlers: EntitlementHandlers) -> Router {
    Router::new()
        .route("/stripe", post(handle_stripe_webhook))
        .with_state(handlers)
}
