//! # Application State
//!
//! Shared state for the Axum application.
//! Built once at startup from the environment and never mutated afterwards.

use crate::cors::OriginAllowList;
use relay_core::{BoxedPaymentStrategy, EventTrust, PaymentError, PaymentResult};
use relay_stripe::{
    EventExtractor, LoggingWebhookHandler, StripeConfig, StripeIntentStrategy, WebhookHandler,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Origins allowed to call the API from a browser
    pub cors_domains: Vec<String>,
    /// Directory served for unmatched GET requests
    pub static_dir: PathBuf,
    /// Explicit opt-in to unsigned webhooks in production
    pub allow_unverified_webhooks: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(8080),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            cors_domains: parse_cors_domains(&lookup("CORS_DOMAINS").unwrap_or_default()),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            allow_unverified_webhooks: lookup("ALLOW_UNVERIFIED_WEBHOOKS")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> PaymentResult<SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|e| {
            PaymentError::Configuration(format!(
                "Invalid socket address {}:{}: {}",
                self.host, self.port, e
            ))
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Split a comma-separated origin list, trimming entries and dropping empties
pub fn parse_cors_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: Arc<AppConfig>,
    /// Payment provider
    pub strategy: BoxedPaymentStrategy,
    /// Origins allowed to call the API from a browser
    pub allow_list: OriginAllowList,
    /// Webhook trust strategy, fixed at startup
    pub extractor: Arc<EventExtractor>,
    /// Side effects for dispatched webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
}

impl AppState {
    /// Assemble state from already-built parts.
    ///
    /// Fails when a CORS origin is unusable, or when webhooks would run
    /// unverified in production without opt-in.
    pub fn new(
        config: AppConfig,
        strategy: BoxedPaymentStrategy,
        extractor: EventExtractor,
    ) -> PaymentResult<Self> {
        let allow_list = OriginAllowList::parse(&config.cors_domains)?;
        check_webhook_policy(&config, &extractor)?;

        Ok(Self {
            config: Arc::new(config),
            strategy,
            allow_list,
            extractor: Arc::new(extractor),
            webhook_handler: Arc::new(LoggingWebhookHandler),
        })
    }

    /// Create AppState with the Stripe strategy, everything read from the environment
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let stripe_config = StripeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Stripe config: {}", e))?;
        let extractor = EventExtractor::from_config(&stripe_config);

        let strategy = StripeIntentStrategy::new(stripe_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        Ok(Self::new(config, Arc::new(strategy), extractor)?)
    }

    /// Replace the webhook side-effect handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }

    /// Trust level every webhook will be processed with
    pub fn webhook_trust(&self) -> EventTrust {
        self.extractor.trust()
    }
}

fn check_webhook_policy(config: &AppConfig, extractor: &EventExtractor) -> PaymentResult<()> {
    if extractor.trust().is_verified() {
        return Ok(());
    }

    if config.is_production() && !config.allow_unverified_webhooks {
        return Err(PaymentError::Configuration(
            "STRIPE_WEBHOOK_SECRET is required in production \
             (set ALLOW_UNVERIFIED_WEBHOOKS=true to override)"
                .to_string(),
        ));
    }

    warn!("STRIPE_WEBHOOK_SECRET not set: webhook signatures will NOT be verified");
    Ok(())
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

    fn stripe_strategy() -> BoxedPaymentStrategy {
        let config = StripeConfig::new("sk_test_abc", "pk_test_xyz");
        Arc::new(StripeIntentStrategy::new(config).unwrap())
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert!(config.cors_domains.is_empty());
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert!(!config.allow_unverified_webhooks);
    }

    #[test]
    fn test_app_config_from_lookup() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "4242"),
            ("CORS_DOMAINS", "http://localhost:3000, https://shop.example.com,,"),
            ("ENVIRONMENT", "production"),
            ("ALLOW_UNVERIFIED_WEBHOOKS", "TRUE"),
        ]));

        assert_eq!(config.port, 4242);
        assert_eq!(
            config.cors_domains,
            vec!["http://localhost:3000", "https://shop.example.com"]
        );
        assert!(config.is_production());
        assert!(config.allow_unverified_webhooks);
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = AppConfig::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");

        let bad = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(bad.socket_addr(), Err(PaymentError::Configuration(_))));
    }

    #[test]
    fn test_parse_cors_domains() {
        assert!(parse_cors_domains("").is_empty());
        assert_eq!(parse_cors_domains(" a , b"), vec!["a", "b"]);
    }

    #[test]
    fn test_wildcard_cors_domain_refused() {
        let config = AppConfig::from_lookup(lookup_from(&[("CORS_DOMAINS", "*")]));
        assert_eq!(config.cors_domains, vec!["*"]);

        let result = AppState::new(config, stripe_strategy(), EventExtractor::Unverified);
        assert!(matches!(result, Err(PaymentError::Configuration(_))));
    }

    #[test]
    fn test_unencodable_cors_domain_refused() {
        let config = AppConfig {
            cors_domains: vec![
                "https://shop.example.com".to_string(),
                "http://bad\u{1}".to_string(),
            ],
            ..AppConfig::default()
        };

        let result = AppState::new(config, stripe_strategy(), EventExtractor::Unverified);
        assert!(matches!(result, Err(PaymentError::Configuration(_))));
    }

    #[test]
    fn test_unverified_allowed_in_development() {
        let state = AppState::new(AppConfig::default(), stripe_strategy(), EventExtractor::Unverified)
            .unwrap();
        assert_eq!(state.webhook_trust(), EventTrust::Unverified);
    }

    #[test]
    fn test_unverified_refused_in_production() {
        let production = AppConfig {
            environment: "production".to_string(),
            ..AppConfig::default()
        };

        let result = AppState::new(production.clone(), stripe_strategy(), EventExtractor::Unverified);
        assert!(matches!(result, Err(PaymentError::Configuration(_))));

        let opted_in = AppConfig {
            allow_unverified_webhooks: true,
            ..production.clone()
        };
        assert!(AppState::new(opted_in, stripe_strategy(), EventExtractor::Unverified).is_ok());

        let verified = EventExtractor::from_secret(Some("whsec_test"));
        let state = AppState::new(production, stripe_strategy(), verified).unwrap();
        assert_eq!(state.webhook_trust(), EventTrust::Verified);
    }
}
