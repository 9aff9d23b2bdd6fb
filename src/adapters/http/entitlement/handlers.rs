//! HTTP handlers for entitlement endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::entitlement::{
    GetEntitlementHandler, GetEntitlementQuery, IngestWebhookCommand, IngestWebhookHandler,
    VerifyCheckoutCommand, VerifyCheckoutHandler,
};
use crate::domain::entitlement::{VerifyError, WebhookError};
use crate::domain::foundation::{DomainError, ErrorCode};

use super::dto::{ErrorResponse, HealthResponse, VerifyRequest, WebhookResponse};

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct EntitlementHandlers {
    ingest_handler: Arc<IngestWebhookHandler>,
    verify_handler: Arc<VerifyCheckoutHandler>,
    get_handler: Arc<GetEntitlementHandler>,
}

impl EntitlementHandlers {
    pub fn new(
        ingest_handler: Arc<IngestWebhookHandler>,
        verify_handler: Arc<VerifyCheckoutHandler>,
        get_handler: Arc<GetEntitlementHandler>,
    ) -> Self {
        Self {
            ingest_handler,
            verify_handler,
            get_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /webhooks/stripe
///
/// The body is taken as raw bytes; the signature covers them verbatim.
pub async fn handle_stripe_webhook(
    State(handlers): State<EntitlementHandlers>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = IngestWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match handlers.ingest_handler.handle(cmd).await {
        Ok(_) => (StatusCode::OK, Json(WebhookResponse::received())).into_response(),
        Err(e) => handle_webhook_error(e),
    }
}

/// POST /entitlements/verify
///
/// Body rejections are reported in the same error envelope as every other
/// failure on this route.
pub async fn verify_checkout(
    State(handlers): State<EntitlementHandlers>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return handle_body_rejection(rejection),
    };

    let cmd = VerifyCheckoutCommand {
        user_id: user.id,
        session_id: req.session_id,
    };

    match handlers.verify_handler.handle(cmd).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => handle_verify_error(e),
    }
}

/// GET /entitlements/me
pub async fn get_my_entitlement(
    State(handlers): State<EntitlementHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let query = GetEntitlementQuery { user_id: user.id };

    match handlers.get_handler.handle(query).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => handle_domain_error(e),
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

fn handle_webhook_error(error: WebhookError) -> Response {
    let body = ErrorResponse::new(error.error_code(), error.to_string())
        .retryable(error.is_retryable());
    (error.status_code(), Json(body)).into_response()
}

fn handle_body_rejection(rejection: JsonRejection) -> Response {
    let body = ErrorResponse::new("INVALID_REQUEST_BODY", rejection.body_text());
    (rejection.status(), Json(body)).into_response()
}

fn handle_verify_error(error: VerifyError) -> Response {
    if matches!(error, VerifyError::LedgerUnavailable(_)) {
        tracing::error!(error = %error, "Verification failed closed");
    }
    let body = ErrorResponse::new(error.error_code(), error.to_string())
        .retryable(error.is_retryable());
    (error.status_code(), Json(body)).into_response()
}

fn handle_domain_error(error: DomainError) -> Response {
    match error.code {
        ErrorCode::DatabaseError => {
            tracing::error!(error = %error, "Entitlement store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(
                    ErrorResponse::new("LEDGER_UNAVAILABLE", "Entitlement store unavailable")
                        .retryable(true),
                ),
            )
                .into_response()
        }
        _ => {
            tracing::error!(error = %error, "Entitlement read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Internal server error")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_signature_maps_to_401() {
        let response = handle_webhook_error(WebhookError::InvalidSignature);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn missing_signature_maps_to_400() {
        let response = handle_webhook_error(WebhookError::MissingSignature);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn ledger_outage_on_webhook_asks_for_redelivery() {
        let response = handle_webhook_error(WebhookError::LedgerUnavailable("down".into()));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn session_not_found_maps_to_404() {
        let response = handle_verify_error(VerifyError::SessionNotFound);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn provider_outage_maps_to_503() {
        let response = handle_verify_error(VerifyError::ProviderUnavailable("timeout".into()));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn provider_rejection_maps_to_502() {
        let response = handle_verify_error(VerifyError::ProviderRejected("401".into()));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn database_error_maps_to_503() {
        let response = handle_domain_error(DomainError::database("pool closed"));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn other_domain_errors_map_to_500() {
        let response = handle_domain_error(DomainError::new(
            ErrorCode::EntitlementNotFound,
            "missing",
        ));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
