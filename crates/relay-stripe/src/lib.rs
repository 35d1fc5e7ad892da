//! # relay-stripe
//!
//! Stripe integration for payment-relay.
//!
//! 1. **StripeIntentStrategy** - Payment Intents API
//!    - Creates card payment intents
//!    - Returns the client secret for Stripe.js
//!
//! 2. **Webhooks** - signature verification and dispatch
//!    - `EventExtractor` picks verified or unverified intake once, from config
//!    - `dispatch_webhook_event` routes a `NormalizedEvent` to a `WebhookHandler`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay_stripe::{StripeConfig, StripeIntentStrategy};
//! use relay_core::{Currency, PaymentIntentRequest, PaymentStrategy};
//!
//! let strategy = StripeIntentStrategy::new(StripeConfig::from_env()?)?;
//!
//! let request = PaymentIntentRequest::from_major_units(25.0, Currency::USD)?;
//! let intent = strategy.create_payment_intent(&request).await?;
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use relay_stripe::{dispatch_webhook_event, EventExtractor, InboundNotification, WebhookHandler};
//!
//! struct Fulfillment;
//!
//! impl WebhookHandler for Fulfillment {
//!     fn on_payment_succeeded(&self, event: &NormalizedEvent) -> PaymentResult<()> {
//!         // Mark the order paid, dedupe on event.event_id
//!         Ok(())
//!     }
//! }
//!
//! let extractor = EventExtractor::from_config(&config);
//!
//! // In your webhook endpoint:
//! let notification = InboundNotification::new(&body)
//!     .with_signature(signature)
//!     .with_content_type(content_type);
//! let event = extractor.verify_or_extract(&notification)?;
//! dispatch_webhook_event(&Fulfillment, &event)?;
//! ```

pub mod config;
pub mod intents;
pub mod webhook;

// Re-exports
pub use config::StripeConfig;
pub use intents::StripeIntentStrategy;
pub use webhook::{
    dispatch_webhook_event, generate_test_header, EventExtractor, InboundNotification,
    LoggingWebhookHandler, WebhookHandler, WebhookVerifier, HANDLED_WEBHOOK_EVENTS,
    SIGNATURE_HEADER,
};
