//! # Request Handlers
//!
//! Axum request handlers for the payment relay.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use relay_core::{Currency, PaymentError, PaymentIntentRequest, PaymentStrategy};
use relay_stripe::{dispatch_webhook_event, InboundNotification, SIGNATURE_HEADER};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Publishable configuration for the browser
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub publishable_key: String,
}

/// Create payment intent request
#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Amount in major currency units (dollars)
    pub amount: f64,
}

/// Create payment intent response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(response))
}

// =============================================================================
// Handlers
// =============================================================================

/// Root greeting
pub async fn hello() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Hello World" }))
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "payment-relay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Expose the publishable key
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        publishable_key: state.strategy.publishable_key().to_string(),
    })
}

/// Create a USD card payment intent
#[instrument(skip(state, request), fields(amount = request.amount))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<Json<CreatePaymentIntentResponse>, (StatusCode, Json<ErrorResponse>)> {
    let intent_request = PaymentIntentRequest::from_major_units(request.amount, Currency::USD)
        .map_err(payment_error_to_response)?;

    let intent = state
        .strategy
        .create_payment_intent(&intent_request)
        .await
        .map_err(|e| {
            error!("Failed to create payment intent: {}", e);
            payment_error_to_response(e)
        })?;

    info!("Created payment intent: {}", intent.id);

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Handle Stripe webhook
///
/// Answers 400 with an empty body when the notification cannot be
/// authenticated, or is declared as JSON and does not parse; 200 otherwise.
/// Handler failures are logged and still acknowledged.
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let notification = InboundNotification::new(&body)
        .with_signature(signature)
        .with_content_type(content_type);

    let event = match state.extractor.verify_or_extract(&notification) {
        Ok(event) => event,
        Err(e) => {
            warn!("⚠️  Webhook rejected: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };

    info!(
        "Received webhook: type={}, id={:?}, trust={}",
        event.event_type, event.event_id, event.trust
    );

    if let Err(e) = dispatch_webhook_event(state.webhook_handler.as_ref(), &event) {
        error!("Webhook handler error for {}: {}", event.event_type, e);
    }

    StatusCode::OK
}
