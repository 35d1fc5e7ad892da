//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! All secrets are loaded from environment variables once at startup.

use relay_core::PaymentError;
use std::env;

pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
pub const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_...)
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...)
    pub publishable_key: String,

    /// Webhook signing secret (whsec_...). `None` disables verification.
    pub webhook_secret: Option<String>,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_PUBLISHABLE_KEY`
    ///
    /// Optional:
    /// - `STRIPE_WEBHOOK_SECRET` (absent or empty means unverified webhooks)
    /// - `STRIPE_API_BASE_URL`
    pub fn from_env() -> Result<Self, PaymentError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("STRIPE_SECRET_KEY").ok_or_else(|| {
            PaymentError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;

        let publishable_key = lookup("STRIPE_PUBLISHABLE_KEY").ok_or_else(|| {
            PaymentError::Configuration("STRIPE_PUBLISHABLE_KEY not set".to_string())
        })?;

        let webhook_secret = lookup("STRIPE_WEBHOOK_SECRET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        // Validate key formats
        if !secret_key.starts_with("sk_test_") && !secret_key.starts_with("sk_live_") {
            return Err(PaymentError::Configuration(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_string(),
            ));
        }

        if !publishable_key.starts_with("pk_test_") && !publishable_key.starts_with("pk_live_") {
            return Err(PaymentError::Configuration(
                "STRIPE_PUBLISHABLE_KEY must start with pk_test_ or pk_live_".to_string(),
            ));
        }

        if let Some(ref secret) = webhook_secret {
            if !secret.starts_with("whsec_") {
                return Err(PaymentError::Configuration(
                    "STRIPE_WEBHOOK_SECRET must start with whsec_".to_string(),
                ));
            }
        }

        let api_base_url = lookup("STRIPE_API_BASE_URL")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            secret_key,
            publishable_key,
            webhook_secret,
            api_base_url,
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, publishable_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: publishable_key.into(),
            webhook_secret: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set the webhook signing secret. Empty disables verification.
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        self.webhook_secret = if secret.is_empty() { None } else { Some(secret) };
        self
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"<redacted>")
            .field("publishable_key", &self.publishable_key)
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_webhook_secret_builder() {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789");
        assert!(config.webhook_secret.is_none());

        let config = config.with_webhook_secret("whsec_secret");
        assert_eq!(config.webhook_secret.as_deref(), Some("whsec_secret"));

        let config = config.with_webhook_secret("");
        assert!(config.webhook_secret.is_none());
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123", "pk_test_xyz789");
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
    }

    #[test]
    fn test_from_lookup_missing_key() {
        let result = StripeConfig::from_lookup(lookup_from(&[(
            "STRIPE_PUBLISHABLE_KEY",
            "pk_test_xyz",
        )]));
        assert!(matches!(result, Err(PaymentError::Configuration(_))));
    }

    #[test]
    fn test_from_lookup_without_webhook_secret() {
        let config = StripeConfig::from_lookup(lookup_from(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz"),
            ("STRIPE_WEBHOOK_SECRET", "  "),
        ]))
        .unwrap();

        assert!(config.webhook_secret.is_none());
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_from_lookup_with_webhook_secret() {
        let config = StripeConfig::from_lookup(lookup_from(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_test"),
            ("STRIPE_API_BASE_URL", "http://127.0.0.1:12111"),
        ]))
        .unwrap();

        assert_eq!(config.webhook_secret.as_deref(), Some("whsec_test"));
        assert_eq!(config.api_base_url, "http://127.0.0.1:12111");
    }

    #[test]
    fn test_rejects_malformed_keys() {
        let bad_secret = StripeConfig::from_lookup(lookup_from(&[
            ("STRIPE_SECRET_KEY", "pk_test_wrong"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz"),
        ]));
        assert!(bad_secret.is_err());

        let bad_webhook = StripeConfig::from_lookup(lookup_from(&[
            ("STRIPE_SECRET_KEY", "sk_test_abc"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz"),
            ("STRIPE_WEBHOOK_SECRET", "not-a-secret"),
        ]));
        assert!(bad_webhook.is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = StripeConfig::new("sk_test_supersecret", "pk_test_xyz")
            .with_webhook_secret("whsec_hidden");
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("supersecret"));
        assert!(!rendered.contains("whsec_hidden"));
        assert!(rendered.contains("pk_test_xyz"));
    }
}
