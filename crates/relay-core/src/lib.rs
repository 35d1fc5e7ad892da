//! # relay-core
//!
//! Core types and traits for the payment relay.
//!
//! This crate provides:
//! - `PaymentStrategy` trait for implementing payment providers
//! - `PaymentIntentRequest` and `PaymentIntent` for the intent flow
//! - `NormalizedEvent`, `WebhookEventType` and `EventTrust` for webhooks
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use relay_core::{Currency, PaymentIntentRequest, PaymentStrategy};
//!
//! // 19.99 dollars -> 1999 cents
//! let request = PaymentIntentRequest::from_major_units(19.99, Currency::USD)?;
//!
//! let intent = strategy.create_payment_intent(&request).await?;
//!
//! // Hand intent.client_secret to the browser
//! ```

pub mod error;
pub mod event;
pub mod intent;
pub mod money;
pub mod strategy;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use event::{EventTrust, NormalizedEvent, WebhookEventType};
pub use intent::{PaymentIntent, PaymentIntentRequest};
pub use money::Currency;
pub use strategy::{BoxedPaymentStrategy, PaymentStrategy};
