//! Payment signals: the normalized form of "something happened to a payment".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{IdempotencyKey, Timestamp, UserId};

use super::ProviderStatus;

/// Ingress path a signal arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    /// Provider-pushed webhook delivery.
    Webhook,
    /// Client-triggered verification after checkout redirect.
    Verify,
}

impl SignalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::Webhook => "webhook",
            SignalSource::Verify => "verify",
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral signal fed to the state machine. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSignal {
    pub idempotency_key: IdempotencyKey,
    pub user_id: UserId,
    pub amount_minor_units: i64,
    pub currency: String,
    pub provider_status: ProviderStatus,
    pub occurred_at: Timestamp,
    /// Provider customer reference, captured onto the entitlement record.
    pub provider_customer_id: Option<String>,
    pub source: SignalSource,
}

impl PaymentSignal {
    pub fn is_success(&self) -> bool {
        self.provider_status.is_success()
    }
}
