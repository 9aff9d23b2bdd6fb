//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, authentication types and error types used by the
//! entitlement domain and its adapters.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{IdempotencyKey, UserId};
pub use timestamp::Timestamp;
