//! # Webhook Event Types
//!
//! Provider-neutral representation of an inbound webhook event after the
//! trust decision has been made.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Webhook event types we care about
///
/// Serializes as the provider type tag, so `Unknown` tags survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WebhookEventType {
    /// `payment_intent.succeeded`: funds captured
    PaymentSucceeded,
    /// `payment_intent.payment_failed`
    PaymentFailed,
    /// Anything else, including a missing type (passthrough)
    Unknown(String),
}

impl WebhookEventType {
    /// Map a provider type tag onto a known variant.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "payment_intent.succeeded" => WebhookEventType::PaymentSucceeded,
            "payment_intent.payment_failed" => WebhookEventType::PaymentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    /// The provider type tag this variant was built from
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::PaymentSucceeded => "payment_intent.succeeded",
            WebhookEventType::PaymentFailed => "payment_intent.payment_failed",
            WebhookEventType::Unknown(tag) => tag,
        }
    }
}

impl From<String> for WebhookEventType {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<WebhookEventType> for String {
    fn from(event_type: WebhookEventType) -> Self {
        match event_type {
            WebhookEventType::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an event's authenticity was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventTrust {
    /// Signature checked against the configured signing secret
    Verified,
    /// Taken from the request body as-is (no signing secret configured)
    Unverified,
}

impl EventTrust {
    pub fn is_verified(&self) -> bool {
        matches!(self, EventTrust::Verified)
    }
}

impl fmt::Display for EventTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTrust::Verified => f.write_str("verified"),
            EventTrust::Unverified => f.write_str("unverified"),
        }
    }
}

/// A webhook event normalized to type + payload.
///
/// Never persisted. The same logical event may be delivered more than once,
/// so consumers with non-idempotent side effects should deduplicate on
/// [`NormalizedEvent::event_id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Event ID from provider (absent on hand-crafted unverified bodies)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Event type
    pub event_type: WebhookEventType,

    /// Event-specific payload, passed through untouched
    pub data: serde_json::Value,

    /// How this event was obtained
    pub trust: EventTrust,

    /// Provider creation time, when the body carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NormalizedEvent {
    pub fn new(event_type: WebhookEventType, data: serde_json::Value, trust: EventTrust) -> Self {
        Self {
            event_id: None,
            event_type,
            data,
            trust,
            created_at: None,
        }
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// The `data.object` payload Stripe wraps every event in, if present
    pub fn object(&self) -> Option<&serde_json::Value> {
        self.data.get("object")
    }

    /// `data.object.id` (e.g. the payment intent ID)
    pub fn object_id(&self) -> Option<&str> {
        self.object()
            .and_then(|o| o.get("id"))
            .and_then(|v| v.as_str())
    }
}
