//! Billing Console - API Server Binary
//!
//! Starts the HTTP API for the voucher mixed-payment flow, backed by the
//! in-memory billing store seeded with demo data.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin billing-api
//!
//! # Run with environment variables
//! API_PORT=9090 API_URGENT_WINDOW_DAYS=5 API_MOCK_LATENCY_MS=300 cargo run --bin billing-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_CURRENCY` - Billing currency code (default: CNY)
//! * `API_URGENT_WINDOW_DAYS` - Expiry window of the urgent tier (default: 7)
//! * `API_SOON_WINDOW_DAYS` - Expiry window of the soon tier (default: 30)
//! * `API_MOCK_LATENCY_MS` - Simulated backend latency (default: 0)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use domain_billing::ports::mock::InMemoryBillingStore;
use domain_billing::PaymentService;
use interface_api::{config::ApiConfig, create_router, demo::seed_demo_store};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Failed to load config from environment, using defaults: {}", e);
        ApiConfig::default()
    });
    config.validate().context("invalid configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        currency = %config.currency,
        "Starting billing API server"
    );

    let store = Arc::new(InMemoryBillingStore::new().with_latency(config.mock_latency()));
    let seed = seed_demo_store(&store, config.currency()?)
        .await
        .context("failed to seed demo data")?;
    tracing::info!(
        account_id = %seed.account_id,
        orders = ?seed.order_ids,
        vouchers = seed.voucher_ids.len(),
        "Demo data loaded"
    );

    let service = PaymentService::new(store.clone(), store.clone(), store.clone(), store)
        .with_policy(config.ranking_policy()?);

    let app = create_router(service);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
