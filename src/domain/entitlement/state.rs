//! Entitlement access level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Access level granted to a user.
///
/// Legal moves are decided by the transition table alone; `Pro` never
/// returns to `Free`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementState {
    #[default]
    Free,
    Pro,
}

impl EntitlementState {
    pub fn is_pro(&self) -> bool {
        matches!(self, EntitlementState::Pro)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitlementState::Free => "free",
            EntitlementState::Pro => "pro",
        }
    }
}

impl fmt::Display for EntitlementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntitlementState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(EntitlementState::Free),
            "pro" => Ok(EntitlementState::Pro),
            other => Err(ValidationError::invalid_format(
                "entitlement_state",
                format!("unknown value '{}'", other),
            )),
        }
    }
}
