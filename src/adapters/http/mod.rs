//! HTTP adapter - axum routes, handlers and middleware.

pub mod app;
pub mod entitlement;
pub mod middleware;

pub use app::create_app;
pub use entitlement::{EntitlementHandlers, SIGNATURE_HEADER};
pub use middleware::{auth_middleware, AuthState, RequireAuth};
