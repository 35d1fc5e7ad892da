//! # CORS
//!
//! Origin allow-list for browser callers.
//!
//! Requests carrying an `Origin` that is not on the list are refused with 403
//! before they reach a handler. Requests without `Origin` (server-to-server,
//! Stripe webhooks, curl) always pass.

use crate::handlers::ErrorResponse;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use relay_core::{PaymentError, PaymentResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// Set of origins allowed to call the API
///
/// Every entry is an exact origin; the `*` wildcard is not accepted.
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    origins: Arc<HashSet<HeaderValue>>,
}

impl OriginAllowList {
    /// Build from configured origins, refusing entries that cannot be echoed
    /// back in `Access-Control-Allow-Origin`.
    pub fn parse<I, S>(origins: I) -> PaymentResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = origins
            .into_iter()
            .map(|origin| {
                let origin = origin.as_ref();
                if origin == "*" {
                    return Err(PaymentError::Configuration(
                        "CORS_DOMAINS cannot contain `*`; list each allowed origin".to_string(),
                    ));
                }
                HeaderValue::from_str(origin).map_err(|_| {
                    PaymentError::Configuration(format!(
                        "CORS_DOMAINS entry {:?} is not a valid origin",
                        origin
                    ))
                })
            })
            .collect::<PaymentResult<HashSet<_>>>()?;

        Ok(Self {
            origins: Arc::new(origins),
        })
    }

    /// A missing origin is always allowed
    pub fn is_allowed(&self, origin: Option<&HeaderValue>) -> bool {
        match origin {
            None => true,
            Some(origin) => self.origins.contains(origin),
        }
    }

    /// Response headers for allowed origins
    pub fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.origins.iter().cloned()))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(Duration::from_secs(3600))
    }
}

/// Middleware rejecting requests from origins outside the allow-list
pub async fn enforce_origin(
    State(allow_list): State<OriginAllowList>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN);

    if !allow_list.is_allowed(origin) {
        warn!("Rejected request from origin {:?}", origin);
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse::new("Not allowed by CORS", 403)),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(value: &'static str) -> Option<HeaderValue> {
        Some(HeaderValue::from_static(value))
    }

    #[test]
    fn test_missing_origin_allowed() {
        let list = OriginAllowList::default();
        assert!(list.is_allowed(None));
        assert!(!list.is_allowed(origin("https://shop.example.com").as_ref()));
    }

    #[test]
    fn test_exact_match_only() {
        let list =
            OriginAllowList::parse(["https://shop.example.com", "http://localhost:3000"]).unwrap();

        assert!(list.is_allowed(origin("https://shop.example.com").as_ref()));
        assert!(list.is_allowed(origin("http://localhost:3000").as_ref()));
        assert!(!list.is_allowed(origin("https://shop.example.com/").as_ref()));
        assert!(!list.is_allowed(origin("http://localhost:3001").as_ref()));
    }

    #[test]
    fn test_wildcard_is_a_configuration_error() {
        let result = OriginAllowList::parse(["https://shop.example.com", "*"]);
        assert!(matches!(result, Err(PaymentError::Configuration(_))));
    }

    #[test]
    fn test_unencodable_origin_is_a_configuration_error() {
        let result = OriginAllowList::parse(["https://shop.example.com\n"]);
        assert!(matches!(result, Err(PaymentError::Configuration(_))));
    }

}
