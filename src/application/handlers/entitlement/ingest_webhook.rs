//! IngestWebhookHandler - Command handler for provider webhook deliveries.

use crate::domain::entitlement::{
    EntitlementState, ProviderEventType, SignalSource, WebhookError, WebhookVerifier,
};
use crate::domain::foundation::Timestamp;

use super::reconcile::{ReconcileOutcome, SignalReconciler};

/// Command to ingest one webhook delivery.
#[derive(Debug, Clone)]
pub struct IngestWebhookCommand {
    /// Raw request body, exactly as signed.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header, if sent.
    pub signature: Option<String>,
}

/// Successful outcomes. Every variant is acknowledged with a 2xx.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAck {
    /// The signal was claimed and committed.
    Processed { state: EntitlementState, upgraded: bool },
    /// The session was already reconciled.
    Duplicate { state: EntitlementState },
    /// The session is not paid yet.
    NotPaid { state: EntitlementState },
    /// Event type not acted on, or livemode mismatch.
    Ignored { event_type: String },
}

/// Verifies, filters and reconciles webhook deliveries.
pub struct IngestWebhookHandler {
    verifier: WebhookVerifier,
    reconciler: SignalReconciler,
    require_livemode: bool,
}

impl IngestWebhookHandler {
    pub fn new(verifier: WebhookVerifier, reconciler: SignalReconciler) -> Self {
        Self {
            verifier,
            reconciler,
            require_livemode: false,
        }
    }

    /// Drop test-mode events instead of reconciling them.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    pub async fn handle(&self, cmd: IngestWebhookCommand) -> Result<WebhookAck, WebhookError> {
        let signature = cmd.signature.ok_or(WebhookError::MissingSignature)?;

        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, &signature)
            .map_err(|e| {
                if e.is_bad_signature() {
                    tracing::warn!(error = %e, "Webhook signature rejected");
                } else {
                    tracing::warn!(error = %e, "Verified webhook payload unparseable");
                }
                e
            })?;

        if self.require_livemode && !event.livemode {
            tracing::info!(event_id = %event.id, event_type = %event.event_type, "Test-mode event ignored");
            return Ok(WebhookAck::Ignored {
                event_type: event.event_type,
            });
        }

        let event_type = event.parsed_type();
        if !event_type.carries_checkout_session() {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Event type ignored");
            return Ok(WebhookAck::Ignored {
                event_type: event.event_type,
            });
        }

        let session = event.checkout_session().map_err(|e| {
            tracing::warn!(event_id = %event.id, error = %e, "Malformed checkout session");
            WebhookError::ParseError(e.to_string())
        })?;

        let occurred_at = Timestamp::from_unix_secs(event.created).unwrap_or_else(Timestamp::now);
        let signal = session
            .to_signal(SignalSource::Webhook, occurred_at)
            .map_err(|e| {
                tracing::warn!(event_id = %event.id, error = %e, "Checkout session missing signal fields");
                WebhookError::from(e)
            })?;

        if event_type == ProviderEventType::CheckoutSessionAsyncPaymentSucceeded {
            tracing::debug!(idempotency_key = %signal.idempotency_key, "Delayed payment cleared");
        }

        let outcome = self.reconciler.reconcile(&signal).await.map_err(|e| {
            tracing::error!(
                idempotency_key = %signal.idempotency_key,
                error = %e,
                "Ledger unavailable during webhook ingestion"
            );
            WebhookError::LedgerUnavailable(e.to_string())
        })?;

        Ok(match outcome {
            ReconcileOutcome::Applied { state, upgraded } => WebhookAck::Processed { state, upgraded },
            ReconcileOutcome::Duplicate { state } => WebhookAck::Duplicate { state },
            ReconcileOutcome::NotPaid { state } => WebhookAck::NotPaid { state },
        })
    }
}
