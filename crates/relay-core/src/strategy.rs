//! # Payment Strategy Trait
//!
//! Seam between the HTTP layer and the payment provider.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentStrategy (trait)                  │
//! │  ├── create_payment_intent()                                │
//! │  ├── publishable_key()                                      │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │ StripeIntent  │
//!                    │   Strategy    │
//!                    └───────────────┘
//! ```
//!
//! Webhook verification is not part of this trait: the trust mode is picked
//! once at startup and lives next to the provider's signing scheme.

use crate::error::PaymentResult;
use crate::intent::{PaymentIntent, PaymentIntentRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a payment intent and return it with its client secret.
    ///
    /// # Arguments
    /// * `request` - Amount, currency and idempotency key
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> PaymentResult<PaymentIntent>;

    /// Key the browser uses to initialise the provider's client library.
    fn publishable_key(&self) -> &str;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    struct FixedStrategy;

    #[async_trait]
    impl PaymentStrategy for FixedStrategy {
        async fn create_payment_intent(
            &self,
            request: &PaymentIntentRequest,
        ) -> PaymentResult<PaymentIntent> {
            Ok(PaymentIntent {
                id: "pi_fixed".to_string(),
                client_secret: "pi_fixed_secret_abc".to_string(),
                amount: request.amount,
                currency: request.currency,
                status: "requires_payment_method".to_string(),
            })
        }

        fn publishable_key(&self) -> &str {
            "pk_test_fixed"
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_strategy_through_dyn() {
        let strategy: BoxedPaymentStrategy = Arc::new(FixedStrategy);
        let request = PaymentIntentRequest::new(2500, Currency::USD);

        let intent = strategy.create_payment_intent(&request).await.unwrap();

        assert_eq!(intent.amount, 2500);
        assert_eq!(intent.client_secret, "pi_fixed_secret_abc");
        assert_eq!(strategy.publishable_key(), "pk_test_fixed");
        assert_eq!(strategy.provider_name(), "fixed");
    }
}
