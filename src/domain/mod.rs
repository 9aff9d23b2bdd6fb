//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, errors, auth types)
//! - `entitlement` - Entitlement states, payment signals, the transition
//!   function and webhook verification

pub mod entitlement;
pub mod foundation;
