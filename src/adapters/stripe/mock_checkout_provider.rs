//! Mock checkout session provider for testing.
//!
//! Serves pre-configured sessions, supports error injection and counts
//! lookups so tests can assert the provider was (or was not) called.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::entitlement::CheckoutSession;
use crate::ports::{CheckoutSessionProvider, ProviderError};

/// In-memory `CheckoutSessionProvider`.
///
/// ```ignore
/// let provider = MockCheckoutProvider::new().with_session(session);
/// provider.fail_next(ProviderError::network("timeout")).await;
/// ```
#[derive(Default)]
pub struct MockCheckoutProvider {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
    /// Returned once, then cleared.
    next_error: Mutex<Option<ProviderError>>,
    fetch_count: AtomicU32,
}

impl MockCheckoutProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, session: CheckoutSession) -> Self {
        self.sessions.get_mut().insert(session.id.clone(), session);
        self
    }

    /// Adds or replaces a session at runtime.
    pub async fn put_session(&self, session: CheckoutSession) {
        self.sessions.lock().await.insert(session.id.clone(), session);
    }

    pub async fn fail_next(&self, error: ProviderError) {
        *self.next_error.lock().await = Some(error);
    }

    /// Number of `fetch_session` calls made so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckoutSessionProvider for MockCheckoutProvider {
    async fn fetch_session(&self, session_id: &str) -> Result<CheckoutSession, ProviderError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.next_error.lock().await.take() {
            return Err(error);
        }

        self.sessions
            .lock()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("Checkout session"))
    }
}
