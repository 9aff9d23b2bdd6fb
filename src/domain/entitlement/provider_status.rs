//! Payment status as reported by the provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Checkout payment status (`payment_status` on a Stripe checkout session).
///
/// Unrecognized values are preserved verbatim and never count as success.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderStatus {
    /// Funds captured.
    Paid,
    /// Checkout finished without payment (e.g. a 100% discount).
    NoPaymentRequired,
    /// Payment not yet received (delayed payment methods, abandoned sessions).
    Unpaid,
    Other(String),
}

impl ProviderStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "paid" => ProviderStatus::Paid,
            "no_payment_required" => ProviderStatus::NoPaymentRequired,
            "unpaid" => ProviderStatus::Unpaid,
            other => ProviderStatus::Other(other.to_string()),
        }
    }

    /// Whether this status entitles the buyer to the product.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ProviderStatus::Paid | ProviderStatus::NoPaymentRequired
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProviderStatus::Paid => "paid",
            ProviderStatus::NoPaymentRequired => "no_payment_required",
            ProviderStatus::Unpaid => "unpaid",
            ProviderStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProviderStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ProviderStatus::parse(&raw))
    }
}
