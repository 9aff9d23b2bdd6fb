//! HTTP middleware for axum.

pub mod auth;

pub use auth::{auth_middleware, AuthRejection, AuthState, RequireAuth};
