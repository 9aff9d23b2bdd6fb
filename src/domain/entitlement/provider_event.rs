//! Provider webhook event envelope.
//!
//! Only the fields the engine reads are captured; everything else in the
//! provider's schema is ignored.

use serde::{Deserialize, Serialize};

use super::checkout_session::CheckoutSession;

/// Stripe webhook event.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Object containing event-specific data.
    pub data: ProviderEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,

    /// API version used to render this event.
    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

/// Event types the engine acts on. Everything else is `Ignored`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEventType {
    /// Checkout finished. `payment_status` may still be `unpaid` for delayed methods.
    CheckoutSessionCompleted,
    /// A delayed payment for a completed checkout has cleared.
    CheckoutSessionAsyncPaymentSucceeded,
    /// Any other type string, kept for logging.
    Ignored(String),
}

impl ProviderEventType {
    pub fn parse(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "checkout.session.async_payment_succeeded" => {
                Self::CheckoutSessionAsyncPaymentSucceeded
            }
            other => Self::Ignored(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CheckoutSessionAsyncPaymentSucceeded => {
                "checkout.session.async_payment_succeeded"
            }
            Self::Ignored(s) => s,
        }
    }

    /// Whether events of this type carry a checkout session to reconcile.
    pub fn carries_checkout_session(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }
}

impl ProviderEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> ProviderEventType {
        ProviderEventType::parse(&self.event_type)
    }

    /// Deserializes `data.object` as a checkout session.
    pub fn checkout_session(&self) -> Result<CheckoutSession, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(event_type: &str) -> ProviderEvent {
        serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": event_type,
            "created": 1704067200,
            "data": { "object": { "id": "cs_1", "payment_status": "paid" } },
            "livemode": false,
            "api_version": "2023-10-16"
        }))
        .unwrap()
    }

    #[test]
    fn parses_recognized_success_types() {
        assert_eq!(
            event("checkout.session.completed").parsed_type(),
            ProviderEventType::CheckoutSessionCompleted
        );
        assert_eq!(
            event("checkout.session.async_payment_succeeded").parsed_type(),
            ProviderEventType::CheckoutSessionAsyncPaymentSucceeded
        );
    }

    #[test]
    fn unknown_types_map_to_ignored() {
        let t = event("invoice.paid").parsed_type();
        assert_eq!(t, ProviderEventType::Ignored("invoice.paid".to_string()));
        assert!(!t.carries_checkout_session());
    }

    #[test]
    fn near_miss_type_is_ignored_not_matched() {
        let t = ProviderEventType::parse("checkout.session.complete");
        assert!(matches!(t, ProviderEventType::Ignored(_)));
    }

    #[test]
    fn as_str_round_trips() {
        for raw in [
            "checkout.session.completed",
            "checkout.session.async_payment_succeeded",
            "customer.created",
        ] {
            assert_eq!(ProviderEventType::parse(raw).as_str(), raw);
        }
    }

    #[test]
    fn extracts_checkout_session() {
        let session = event("checkout.session.completed")
            .checkout_session()
            .unwrap();
        assert_eq!(session.id, "cs_1");
        assert_eq!(session.payment_status.as_deref(), Some("paid"));
    }

    #[test]
    fn api_version_and_livemode_are_optional() {
        let e: ProviderEvent = serde_json::from_value(serde_json::json!({
            "id": "evt_2",
            "type": "ping",
            "created": 1,
            "data": { "object": {} }
        }))
        .unwrap();
        assert!(!e.livemode);
        assert!(e.api_version.is_none());
    }
}
