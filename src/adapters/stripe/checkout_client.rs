//! Stripe checkout session client.
//!
//! Implements `CheckoutSessionProvider` against the Stripe REST API. Only the
//! session retrieval endpoint is used; everything the verify path trusts
//! comes from this authenticated server-to-server call.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::PaymentConfig;
use crate::domain::entitlement::{is_valid_session_id, CheckoutSession};
use crate::ports::{CheckoutSessionProvider, ProviderError, ProviderErrorCode};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    timeout: std::time::Duration,
}

impl StripeConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: std::time::Duration::from_secs(10),
        }
    }

    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self::new(config.stripe_api_key.clone())
            .with_base_url(config.stripe_api_base_url.clone())
            .with_timeout(config.provider_timeout())
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn session_url(&self, session_id: &str) -> String {
        format!("{}/v1/checkout/sessions/{}", self.api_base_url, session_id)
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Retrieves checkout sessions from Stripe.
pub struct StripeCheckoutClient {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeCheckoutClient {
    pub fn new(config: StripeConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl CheckoutSessionProvider for StripeCheckoutClient {
    async fn fetch_session(&self, session_id: &str) -> Result<CheckoutSession, ProviderError> {
        if !is_valid_session_id(session_id) {
            return Err(ProviderError::not_found("Checkout session"));
        }

        let url = self.config.session_url(session_id);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Stripe session lookup failed");
                ProviderError::network(e.to_string())
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::not_found("Checkout session"));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::rate_limited());
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error_status(status, &error_text));
        }

        response.json::<CheckoutSession>().await.map_err(|e| {
            ProviderError::invalid_response(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

/// 4xx answers are permanent for this request; everything else is Stripe's
/// own failure and may clear up.
fn classify_error_status(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let message = format!("Stripe API error ({}): {}", status, body);
    if status.is_client_error() {
        tracing::error!(status = %status, "Stripe rejected session lookup");
        ProviderError::rejected(message)
    } else {
        tracing::warn!(status = %status, "Stripe API error on session lookup");
        ProviderError::new(ProviderErrorCode::ProviderError, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StripeConfig {
        StripeConfig::new(SecretString::new("sk_test_123".to_string()))
    }

    #[test]
    fn session_url_uses_base_url() {
        let config = config().with_base_url("http://localhost:12111/");
        assert_eq!(
            config.session_url("cs_test_1"),
            "http://localhost:12111/v1/checkout/sessions/cs_test_1"
        );
    }

    #[test]
    fn from_payment_config_copies_settings() {
        let mut payment = PaymentConfig::new("sk_test_abc", "whsec_abc");
        payment.stripe_api_base_url = "http://stripe-mock:12111".to_string();
        payment.provider_timeout_secs = 3;

        let config = StripeConfig::from_payment_config(&payment);

        assert_eq!(config.api_base_url, "http://stripe-mock:12111");
        assert_eq!(config.timeout, std::time::Duration::from_secs(3));
    }

    #[test]
    fn debug_output_hides_api_key() {
        assert!(!format!("{:?}", config()).contains("sk_test_123"));
    }

    #[test]
    fn client_errors_are_not_retryable() {
        for status in [
            reqwest::StatusCode::BAD_REQUEST,
            reqwest::StatusCode::UNAUTHORIZED,
            reqwest::StatusCode::FORBIDDEN,
        ] {
            let err = classify_error_status(status, "{}");
            assert_eq!(err.code, ProviderErrorCode::Rejected);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn server_errors_are_retryable() {
        for status in [
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            reqwest::StatusCode::BAD_GATEWAY,
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = classify_error_status(status, "{}");
            assert_eq!(err.code, ProviderErrorCode::ProviderError);
            assert!(err.is_retryable());
        }
    }

    #[tokio::test]
    async fn malformed_session_id_never_reaches_network() {
        // Unroutable base URL: a network attempt would yield NetworkError.
        let client = StripeCheckoutClient::new(config().with_base_url("http://127.0.0.1:1")).unwrap();

        let result = client.fetch_session("cs_1/../../v1/customers").await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn connection_failure_is_retryable_network_error() {
        let client = StripeCheckoutClient::new(
            config()
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(std::time::Duration::from_secs(2)),
        )
        .unwrap();

        let err = client.fetch_session("cs_test_1").await.unwrap_err();

        assert_eq!(err.code, ProviderErrorCode::NetworkError);
        assert!(err.is_retryable());
    }
}
