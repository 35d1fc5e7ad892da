//! # payment-relay
//!
//! Stripe payment intent relay.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...   # optional outside production
//! export CORS_DOMAINS=http://localhost:3000
//!
//! # Run the server
//! payment-relay
//! ```

use relay_core::PaymentStrategy;
use relay_server::{routes, state::AppState};
use relay_stripe::HANDLED_WEBHOOK_EVENTS;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Initialize application state
    let state = AppState::from_env()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.strategy.provider_name());
    info!("Webhook trust: {}", state.webhook_trust());
    info!("CORS origins: {:?}", state.config.cors_domains);

    // Create router
    let app = routes::create_router(state);

    info!("Payment relay listening on http://{}", addr);

    if !is_prod {
        info!("Config: GET http://{}/config", addr);
        info!("Intent: POST http://{}/create-payment-intent", addr);
        info!("Webhook: POST http://{}/webhook ({})", addr, HANDLED_WEBHOOK_EVENTS.join(", "));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
