//! Webhook error types for provider webhook ingestion.
//!
//! Status codes decide the provider's retry behavior: 2xx stops delivery,
//! anything else is redelivered on the provider's backoff schedule.

use axum::http::StatusCode;
use thiserror::Error;

use super::checkout_session::SignalError;

/// Errors that occur during webhook ingestion.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The signature header was not sent.
    #[error("Missing signature header")]
    MissingSignature,

    /// The signature header could not be parsed.
    #[error("Invalid signature header: {0}")]
    InvalidSignatureHeader(String),

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse the verified payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the embedded checkout session.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The ledger or entitlement store could not be reached.
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

impl WebhookError {
    /// Authentication failure of the payload itself.
    pub fn is_bad_signature(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignatureHeader(_)
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }

    /// Payload authenticated but unusable.
    pub fn is_malformed_payload(&self) -> bool {
        matches!(
            self,
            WebhookError::ParseError(_) | WebhookError::MissingField(_)
        )
    }

    /// Returns true if a redelivery of the same payload may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::LedgerUnavailable(_))
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                StatusCode::UNAUTHORIZED
            }

            WebhookError::MissingSignature
            | WebhookError::InvalidSignatureHeader(_)
            | WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,

            WebhookError::LedgerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        if self.is_bad_signature() {
            "BAD_SIGNATURE"
        } else if self.is_malformed_payload() {
            "MALFORMED_PAYLOAD"
        } else {
            "LEDGER_UNAVAILABLE"
        }
    }
}

impl From<SignalError> for WebhookError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::MissingField(field) => WebhookError::MissingField(field),
            other => WebhookError::ParseError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_signature_displays_correctly() {
        assert_eq!(WebhookError::InvalidSignature.to_string(), "Invalid signature");
    }

    #[test]
    fn missing_field_displays_field_name() {
        let err = WebhookError::MissingField("payment_status");
        assert_eq!(err.to_string(), "Missing field: payment_status");
    }

    #[test]
    fn signature_failures_are_bad_signature() {
        for err in [
            WebhookError::MissingSignature,
            WebhookError::InvalidSignatureHeader("no v1".to_string()),
            WebhookError::InvalidSignature,
            WebhookError::TimestampOutOfRange,
            WebhookError::InvalidTimestamp,
        ] {
            assert!(err.is_bad_signature(), "{:?}", err);
            assert_eq!(err.error_code(), "BAD_SIGNATURE");
            assert!(err.status_code().is_client_error());
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn parse_failures_are_malformed_payload() {
        for err in [
            WebhookError::ParseError("bad json".to_string()),
            WebhookError::MissingField("id"),
        ] {
            assert!(err.is_malformed_payload());
            assert_eq!(err.error_code(), "MALFORMED_PAYLOAD");
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn ledger_unavailable_is_retryable_server_error() {
        let err = WebhookError::LedgerUnavailable("pool timed out".to_string());
        assert!(err.is_retryable());
        assert!(err.status_code().is_server_error());
        assert_eq!(err.error_code(), "LEDGER_UNAVAILABLE");
    }

    #[test]
    fn invalid_signature_returns_unauthorized() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn signal_missing_field_maps_to_missing_field() {
        let err: WebhookError = SignalError::MissingField("client_reference_id").into();
        assert!(matches!(err, WebhookError::MissingField("client_reference_id")));
    }
}
