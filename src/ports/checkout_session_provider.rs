//! CheckoutSessionProvider port - direct lookups of checkout sessions.
//!
//! Used by client-triggered verification, which cannot trust anything the
//! client sends beyond the session id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entitlement::CheckoutSession;

/// Fetches checkout sessions from the payment provider.
#[async_trait]
pub trait CheckoutSessionProvider: Send + Sync {
    /// Retrieves a session by id.
    ///
    /// # Errors
    ///
    /// - `NotFound` - The provider has no such session
    /// - `NetworkError` / `RateLimitExceeded` / `ProviderError` - Transient, may be retried
    /// - `Rejected` / `InvalidResponse` - Permanent for this request
    async fn fetch_session(&self, session_id: &str) -> Result<CheckoutSession, ProviderError>;
}

/// Errors from checkout provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ProviderErrorCode::NotFound, format!("{} not found", resource))
    }

    pub fn rate_limited() -> Self {
        Self::new(ProviderErrorCode::RateLimitExceeded, "Rate limit exceeded")
    }

    /// A 4xx answer other than not-found or rate-limited; retrying the same
    /// request cannot succeed.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Rejected, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ProviderErrorCode::NotFound
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Provider error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorCode {
    /// Resource not found.
    NotFound,
    /// Network connectivity issue or timeout.
    NetworkError,
    RateLimitExceeded,
    /// The provider failed on its side (5xx).
    ProviderError,
    /// The provider refused the request (4xx such as a bad or revoked key).
    Rejected,
    /// The provider answered with a body we could not read.
    InvalidResponse,
}

impl ProviderErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderErrorCode::NetworkError
                | ProviderErrorCode::RateLimitExceeded
                | ProviderErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderErrorCode::NotFound => "not_found",
            ProviderErrorCode::NetworkError => "network_error",
            ProviderErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            ProviderErrorCode::ProviderError => "provider_error",
            ProviderErrorCode::Rejected => "rejected",
            ProviderErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}
