//! # Payment Intent Types
//!
//! Request and response types for creating a payment intent.

use crate::error::{PaymentError, PaymentResult};
use crate::money::Currency;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request to create a payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,

    /// Currency
    pub currency: Currency,

    /// Accepted payment method types
    pub payment_method_types: Vec<String>,

    /// Idempotency key (prevents duplicate intents on client retries)
    pub idempotency_key: String,
}

impl PaymentIntentRequest {
    /// Card-only intent for an amount already in the smallest unit
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self {
            amount,
            currency,
            payment_method_types: vec!["card".to_string()],
            idempotency_key: Uuid::new_v4().to_string(),
        }
    }

    /// Build from a decimal amount in major units (e.g. `19.99` dollars).
    ///
    /// Rejects non-finite and non-positive amounts.
    pub fn from_major_units(amount: f64, currency: Currency) -> PaymentResult<Self> {
        if !amount.is_finite() {
            return Err(PaymentError::InvalidRequest(
                "amount must be a finite number".to_string(),
            ));
        }

        let smallest = currency.to_smallest_unit(amount);
        if smallest <= 0 {
            return Err(PaymentError::InvalidRequest(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        Ok(Self::new(smallest, currency))
    }

    /// Set idempotency key
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = key.into();
        self
    }
}

/// A payment intent as created by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider's intent ID (pi_...)
    pub id: String,

    /// Secret handed to the browser to confirm the payment
    pub client_secret: String,

    /// Amount in smallest currency unit
    pub amount: i64,

    /// Currency
    pub currency: Currency,

    /// Provider status (e.g. "requires_payment_method")
    pub status: String,
}
