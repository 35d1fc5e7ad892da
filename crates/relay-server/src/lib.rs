//! # relay-server
//!
//! HTTP API layer for payment-relay.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Payment intent and publishable-key endpoints
//! - Stripe webhook intake
//! - Origin allow-list and static asset serving
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Greeting |
//! | GET | `/health` | Health check |
//! | GET | `/config` | Publishable key |
//! | POST | `/create-payment-intent` | Create payment intent |
//! | POST | `/webhook` | Stripe webhook |

pub mod cors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
