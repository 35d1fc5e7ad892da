//! # Stripe Webhook Handling
//!
//! Verification, normalization and dispatch of Stripe webhook events.
//!
//! ```text
//!  InboundNotification { body, Stripe-Signature, Content-Type }
//!            │
//!            ▼
//!   EventExtractor (picked once at startup)
//!     ├── Verified(WebhookVerifier) ── bad signature ──► WebhookVerificationFailed (400)
//!     └── Unverified ─────────────────┐
//!            │                        │
//!            ▼                        ▼
//!        NormalizedEvent { trust: Verified | Unverified }
//!            │
//!            ▼
//!   dispatch_webhook_event ──► WebhookHandler::on_*  (200)
//! ```
//!
//! Stripe delivers at least once and in no particular order. Dispatch keeps no
//! state, so a redelivered event simply reaches the handler again.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use relay_core::{
    EventTrust, NormalizedEvent, PaymentError, PaymentResult, WebhookEventType,
};
use sha2::Sha256;
use tracing::{debug, info, warn};

use crate::config::StripeConfig;

type HmacSha256 = Hmac<Sha256>;

/// Header Stripe puts the signature in
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum accepted age of a signed payload, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Events with a dedicated handler branch
pub const HANDLED_WEBHOOK_EVENTS: &[&str] =
    &["payment_intent.succeeded", "payment_intent.payment_failed"];

// =============================================================================
// Signature Verification
// =============================================================================

/// Checks `Stripe-Signature` headers against a signing secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Override the timestamp tolerance. Zero or negative disables the age check.
    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verify `payload` against `header` and decode it as a trusted event.
    pub fn construct_event(&self, payload: &[u8], header: &str) -> PaymentResult<NormalizedEvent> {
        self.construct_event_at(payload, header, Utc::now().timestamp())
    }

    /// Same as [`construct_event`](Self::construct_event) with an explicit clock.
    pub fn construct_event_at(
        &self,
        payload: &[u8],
        header: &str,
        now: i64,
    ) -> PaymentResult<NormalizedEvent> {
        self.verify_header_at(payload, header, now)?;
        decode_event(payload, EventTrust::Verified)
    }

    /// Signature and timestamp checks only.
    pub fn verify_header_at(&self, payload: &[u8], header: &str, now: i64) -> PaymentResult<()> {
        let sig_parts = parse_signature_header(header)?;

        let mac = signing_mac(&self.secret, sig_parts.timestamp, payload)?;

        // verify_slice compares in constant time
        let valid = sig_parts.signatures.iter().any(|sig| {
            hex::decode(sig)
                .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
                .unwrap_or(false)
        });

        if !valid {
            return Err(PaymentError::WebhookVerificationFailed(
                "Signature mismatch".to_string(),
            ));
        }

        let age = now.saturating_sub(sig_parts.timestamp);
        if self.tolerance_secs > 0 && age > self.tolerance_secs {
            return Err(PaymentError::WebhookVerificationFailed(
                "Timestamp outside tolerance".to_string(),
            ));
        }

        Ok(())
    }
}

// Never print the secret.
impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> PaymentResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim() {
            "t" => {
                timestamp = value.trim().parse().ok();
            }
            "v1" => {
                signatures.push(value.trim().to_string());
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        PaymentError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(PaymentError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// HMAC-SHA256 over `"{timestamp}.{payload}"`, keyed with the full secret.
fn signing_mac(secret: &str, timestamp: i64, payload: &[u8]) -> PaymentResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        PaymentError::Configuration("Webhook secret is not a valid HMAC key".to_string())
    })?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Build a valid `Stripe-Signature` header for `payload`.
///
/// Useful for local tooling and tests that need to post signed events.
pub fn generate_test_header(secret: &str, timestamp: i64, payload: &[u8]) -> PaymentResult<String> {
    let mac = signing_mac(secret, timestamp, payload)?;
    let signature = hex::encode(mac.finalize().into_bytes());
    Ok(format!("t={},v1={}", timestamp, signature))
}

// =============================================================================
// Trust Strategy
// =============================================================================

/// One webhook request as received: raw body plus the headers that matter.
#[derive(Debug, Clone, Copy)]
pub struct InboundNotification<'a> {
    pub body: &'a [u8],
    pub signature: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

impl<'a> InboundNotification<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            body,
            signature: None,
            content_type: None,
        }
    }

    pub fn with_signature(mut self, signature: Option<&'a str>) -> Self {
        self.signature = signature;
        self
    }

    pub fn with_content_type(mut self, content_type: Option<&'a str>) -> Self {
        self.content_type = content_type;
        self
    }

    /// `application/json`, ignoring parameters and case
    pub fn is_json(&self) -> bool {
        self.content_type
            .and_then(|ct| ct.split(';').next())
            .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
            .unwrap_or(false)
    }
}

/// How inbound webhook bodies become [`NormalizedEvent`]s.
///
/// Chosen once from configuration; requests never re-check which mode is active.
#[derive(Debug, Clone)]
pub enum EventExtractor {
    /// Signature required; events come out `EventTrust::Verified`
    Verified(WebhookVerifier),
    /// No signing secret configured; body taken as-is, events come out `EventTrust::Unverified`
    Unverified,
}

impl EventExtractor {
    /// `Verified` for a present, non-empty secret, `Unverified` otherwise.
    pub fn from_secret(secret: Option<&str>) -> Self {
        match secret.map(str::trim) {
            Some(s) if !s.is_empty() => EventExtractor::Verified(WebhookVerifier::new(s)),
            _ => EventExtractor::Unverified,
        }
    }

    pub fn from_config(config: &StripeConfig) -> Self {
        Self::from_secret(config.webhook_secret.as_deref())
    }

    /// Trust level of every event this extractor produces
    pub fn trust(&self) -> EventTrust {
        match self {
            EventExtractor::Verified(_) => EventTrust::Verified,
            EventExtractor::Unverified => EventTrust::Unverified,
        }
    }

    /// Authenticate (when configured) and normalize one inbound notification.
    ///
    /// Verified mode always decodes the signed raw body, whatever its declared
    /// content type. Unverified mode only decodes bodies declared as JSON; any
    /// other body yields an empty event of unknown type.
    ///
    /// Fails with `WebhookVerificationFailed` when a secret is configured and the
    /// signature is missing, malformed, stale or wrong, and with
    /// `WebhookParseError` when a body that must be decoded is not valid JSON.
    pub fn verify_or_extract(
        &self,
        notification: &InboundNotification<'_>,
    ) -> PaymentResult<NormalizedEvent> {
        match self {
            EventExtractor::Verified(verifier) => {
                let header = notification.signature.ok_or_else(|| {
                    PaymentError::WebhookVerificationFailed(
                        "Missing Stripe-Signature header".to_string(),
                    )
                })?;
                verifier.construct_event(notification.body, header)
            }
            EventExtractor::Unverified if notification.is_json() => {
                decode_event(notification.body, EventTrust::Unverified)
            }
            EventExtractor::Unverified => {
                debug!(
                    "Webhook body not declared as JSON ({:?}), treating as empty",
                    notification.content_type
                );
                Ok(NormalizedEvent::new(
                    WebhookEventType::Unknown(String::new()),
                    serde_json::Value::Null,
                    EventTrust::Unverified,
                ))
            }
        }
    }
}

/// Pull `id`, `type`, `created` and `data` out of an event body.
///
/// Absent or non-string `type` becomes an empty unknown tag; absent `data` becomes null.
fn decode_event(payload: &[u8], trust: EventTrust) -> PaymentResult<NormalizedEvent> {
    let body: serde_json::Value = serde_json::from_slice(payload).map_err(|e| {
        PaymentError::WebhookParseError(format!("Failed to parse webhook: {}", e))
    })?;

    let tag = body.get("type").and_then(|v| v.as_str()).unwrap_or_default();
    let data = body.get("data").cloned().unwrap_or(serde_json::Value::Null);

    let mut event = NormalizedEvent::new(WebhookEventType::from_tag(tag), data, trust);

    if let Some(id) = body.get("id").and_then(|v| v.as_str()) {
        event = event.with_event_id(id);
    }

    if let Some(created) = body
        .get("created")
        .and_then(|v| v.as_i64())
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
    {
        event = event.with_created_at(created);
    }

    debug!("Normalized webhook: type={}, trust={}", event.event_type, trust);

    Ok(event)
}

// =============================================================================
// Dispatch
// =============================================================================

/// Webhook event handler trait
///
/// Implement this trait to react to payment events. Any method may be called
/// more than once for the same event ID; handlers with non-idempotent side
/// effects must deduplicate themselves. Check `event.trust` before doing
/// anything that should only follow a verified notification.
pub trait WebhookHandler: Send + Sync {
    /// Called when a payment intent succeeds (funds captured)
    fn on_payment_succeeded(&self, event: &NormalizedEvent) -> PaymentResult<()> {
        info!(
            "Payment captured: intent={:?}, trust={}",
            event.object_id(),
            event.trust
        );
        Ok(())
    }

    /// Called when a payment intent fails
    fn on_payment_failed(&self, event: &NormalizedEvent) -> PaymentResult<()> {
        warn!(
            "Payment failed: intent={:?}, trust={}",
            event.object_id(),
            event.trust
        );
        Ok(())
    }

    /// Called for unknown/unhandled events
    fn on_unknown_event(&self, event: &NormalizedEvent) -> PaymentResult<()> {
        debug!("Unhandled webhook event: {}", event.event_type);
        Ok(())
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: &NormalizedEvent,
) -> PaymentResult<()> {
    match &event.event_type {
        WebhookEventType::PaymentSucceeded => handler.on_payment_succeeded(event),
        WebhookEventType::PaymentFailed => handler.on_payment_failed(event),
        WebhookEventType::Unknown(_) => handler.on_unknown_event(event),
    }
}
