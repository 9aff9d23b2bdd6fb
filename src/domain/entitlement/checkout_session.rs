//! Checkout session payload and signal extraction.
//!
//! The same session object arrives embedded in webhook events and as the body
//! of a direct session lookup, so both ingress paths derive their signal here
//! and share one key space (the session id).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{IdempotencyKey, Timestamp, UserId};

use super::{PaymentSignal, ProviderStatus, SignalSource};

/// Metadata key checked when `client_reference_id` is absent.
pub const USER_ID_METADATA_KEY: &str = "user_id";

const MAX_SESSION_ID_LEN: usize = 255;

/// Whether `id` looks like a provider-issued session id.
///
/// Ids are interpolated into provider URLs, so only ASCII alphanumerics and
/// underscores are accepted.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Stripe checkout session (fields the engine reads).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Session ID (cs_xxx format).
    pub id: String,

    /// Our user id, set when the session was created.
    #[serde(default)]
    pub client_reference_id: Option<String>,

    /// Stripe customer ID.
    #[serde(default)]
    pub customer: Option<String>,

    /// `paid`, `unpaid` or `no_payment_required`.
    #[serde(default)]
    pub payment_status: Option<String>,

    /// `open`, `complete` or `expired`.
    #[serde(default)]
    pub status: Option<String>,

    /// Total in minor units.
    #[serde(default)]
    pub amount_total: Option<i64>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,

    #[serde(default)]
    pub livemode: bool,

    /// Creation time (Unix seconds).
    #[serde(default)]
    pub created: Option<i64>,
}

/// Why a session could not be turned into a signal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl CheckoutSession {
    /// The user this session was opened for.
    pub fn user_reference(&self) -> Option<&str> {
        self.client_reference_id
            .as_deref()
            .or_else(|| self.metadata.get(USER_ID_METADATA_KEY).map(String::as_str))
            .filter(|id| !id.trim().is_empty())
    }

    pub fn provider_status(&self) -> Option<ProviderStatus> {
        self.payment_status.as_deref().map(ProviderStatus::parse)
    }

    /// Builds the payment signal for this session.
    ///
    /// The idempotency key is the session id regardless of `source`. Amount
    /// and currency are required so the payment log never records a
    /// fabricated price.
    pub fn to_signal(
        &self,
        source: SignalSource,
        occurred_at: Timestamp,
    ) -> Result<PaymentSignal, SignalError> {
        let idempotency_key =
            IdempotencyKey::new(self.id.as_str()).map_err(|e| SignalError::InvalidField {
                field: "id",
                reason: e.to_string(),
            })?;

        let user_ref = self
            .user_reference()
            .ok_or(SignalError::MissingField("client_reference_id"))?;
        let user_id = UserId::new(user_ref).map_err(|e| SignalError::InvalidField {
            field: "client_reference_id",
            reason: e.to_string(),
        })?;

        let provider_status = self
            .provider_status()
            .ok_or(SignalError::MissingField("payment_status"))?;

        let amount_minor_units = self
            .amount_total
            .ok_or(SignalError::MissingField("amount_total"))?;
        if amount_minor_units < 0 {
            return Err(SignalError::InvalidField {
                field: "amount_total",
                reason: format!("negative amount {}", amount_minor_units),
            });
        }

        let currency = self
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(SignalError::MissingField("currency"))?
            .to_lowercase();

        Ok(PaymentSignal {
            idempotency_key,
            user_id,
            amount_minor_units,
            currency,
            provider_status,
            occurred_at,
            provider_customer_id: self.customer.clone(),
            source,
        })
    }
}
