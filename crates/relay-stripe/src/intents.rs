//! # Stripe Payment Intents
//!
//! Implementation of the Stripe Payment Intents API.
//! The browser confirms the intent with Stripe.js using the returned client secret.

use crate::config::StripeConfig;
use async_trait::async_trait;
use relay_core::{
    Currency, PaymentError, PaymentIntent, PaymentIntentRequest, PaymentResult, PaymentStrategy,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe Payment Intents strategy
pub struct StripeIntentStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeIntentStrategy {
    /// Create a new Stripe payment intent strategy
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Form body for `POST /v1/payment_intents`
    fn form_params(request: &PaymentIntentRequest) -> Vec<(String, String)> {
        let mut form_params = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.as_str().to_string()),
        ];

        for method in &request.payment_method_types {
            form_params.push(("payment_method_types[]".to_string(), method.clone()));
        }

        form_params
    }
}

#[async_trait]
impl PaymentStrategy for StripeIntentStrategy {
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> PaymentResult<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);

        debug!("Creating Stripe payment intent");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&Self::form_params(request))
            .send()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            // Parse Stripe error
            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(PaymentError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message: error_response.error.message,
                });
            }

            return Err(PaymentError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let intent: StripePaymentIntentResponse = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        let client_secret = intent.client_secret.ok_or_else(|| {
            PaymentError::Serialization("Stripe response has no client_secret".to_string())
        })?;

        info!("Created Stripe payment intent: id={}", intent.id);

        Ok(PaymentIntent {
            id: intent.id,
            client_secret,
            amount: intent.amount,
            currency: intent.currency,
            status: intent.status,
        })
    }

    fn publishable_key(&self) -> &str {
        &self.config.publishable_key
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntentResponse {
    id: String,
    #[serde(default)]
    client_secret: Option<String>,
    amount: i64,
    currency: Currency,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
