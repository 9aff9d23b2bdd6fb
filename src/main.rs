//! Pro Entitlements service binary.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pro_entitlements::adapters::http::{create_app, AuthState, EntitlementHandlers};
use pro_entitlements::adapters::{
    JwtSessionValidator, PostgresEntitlementLedger, PostgresEntitlementStore,
    StripeCheckoutClient, StripeConfig,
};
use pro_entitlements::application::{
    GetEntitlementHandler, IngestWebhookHandler, SignalReconciler, VerifyCheckoutHandler,
};
use pro_entitlements::config::{AppConfig, ServerConfig};
use pro_entitlements::domain::entitlement::WebhookVerifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.server);

    config.validate().context("invalid configuration")?;

    let pool = config
        .database
        .connect()
        .await
        .context("failed to connect to database")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        tracing::info!("Database migrations applied");
    }

    let ledger = Arc::new(PostgresEntitlementLedger::new(pool.clone()));
    let store = Arc::new(PostgresEntitlementStore::new(pool));
    let reconciler = SignalReconciler::new(ledger);

    let provider = StripeCheckoutClient::new(StripeConfig::from_payment_config(&config.payment))
        .context("failed to build Stripe client")?;

    let verifier = WebhookVerifier::new(config.payment.stripe_webhook_secret.clone())
        .with_tolerance(config.payment.webhook_tolerance_secs);

    let handlers = EntitlementHandlers::new(
        Arc::new(
            IngestWebhookHandler::new(verifier, reconciler.clone())
                .with_require_livemode(config.payment.require_livemode),
        ),
        Arc::new(VerifyCheckoutHandler::new(Arc::new(provider), reconciler)),
        Arc::new(GetEntitlementHandler::new(store)),
    );

    let auth: AuthState = Arc::new(JwtSessionValidator::from_config(&config.auth));
    let app = create_app(handlers, auth, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        environment = ?config.server.environment,
        test_mode = config.payment.is_test_mode(),
        "Pro entitlements service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if server.log_json || server.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
