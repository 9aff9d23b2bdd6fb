//! Top-level axum application: routes plus the shared tower layers.

use axum::{
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;

use super::entitlement::{entitlement_routes, handlers::health, webhook_routes, EntitlementHandlers};
use super::middleware::AuthState;

/// Builds the full router.
///
/// ```text
/// GET  /health
/// POST /webhooks/stripe
/// POST /entitlements/verify   (bearer)
/// GET  /entitlements/me       (bearer)
/// ```
pub fn create_app(handlers: EntitlementHandlers, auth: AuthState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/webhooks", webhook_routes(handlers.clone()))
        .nest("/entitlements", entitlement_routes(handlers, auth))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// No configured origins means no cross-origin access.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_origins_are_dropped() {
        let origins = vec![
            "https://app.example.com".to_string(),
            "bad\norigin".to_string(),
        ];
        // Constructing the layer must not panic on the bad entry.
        let _ = cors_layer(&origins);
    }
}
