//! # Routes
//!
//! Axum router configuration for the payment relay.

use crate::cors;
use crate::handlers;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Create the main application router
///
/// Routes:
///   - GET  /                      - Greeting
///   - GET  /health                - Health check
///   - GET  /config                - Publishable key
///   - POST /create-payment-intent - Create payment intent
///   - POST /webhook               - Stripe webhook handler
///   - GET  /*                     - Static files from `STATIC_DIR`
pub fn create_router(state: AppState) -> Router {
    let allow_list = state.allow_list.clone();

    Router::new()
        .route("/", get(handlers::hello))
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .route("/webhook", post(handlers::stripe_webhook))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        // Outermost first: trace, then origin check, then CORS headers
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(
                    allow_list.clone(),
                    cors::enforce_origin,
                ))
                .layer(allow_list.cors_layer()),
        )
        .with_state(state)
}
