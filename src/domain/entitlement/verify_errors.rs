//! Errors returned by client-triggered checkout verification.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while verifying a checkout session on behalf of a user.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The session id is empty or has characters the provider never issues.
    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    /// The provider has no such session, or it belongs to another user.
    #[error("Checkout session not found")]
    SessionNotFound,

    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider refused the lookup or answered with an unusable session.
    /// Retrying the same request gets the same answer.
    #[error("Payment provider rejected the lookup: {0}")]
    ProviderRejected(String),

    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

impl VerifyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerifyError::InvalidSessionId(_) => StatusCode::BAD_REQUEST,
            VerifyError::SessionNotFound => StatusCode::NOT_FOUND,
            VerifyError::ProviderRejected(_) => StatusCode::BAD_GATEWAY,
            VerifyError::ProviderUnavailable(_) | VerifyError::LedgerUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            VerifyError::InvalidSessionId(_) => "INVALID_SESSION_ID",
            VerifyError::SessionNotFound => "SESSION_NOT_FOUND",
            VerifyError::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            VerifyError::ProviderRejected(_) => "PROVIDER_REJECTED",
            VerifyError::LedgerUnavailable(_) => "LEDGER_UNAVAILABLE",
        }
    }

    /// Returns true if the client may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VerifyError::ProviderUnavailable(_) | VerifyError::LedgerUnavailable(_)
        )
    }
}
