//! # Currency
//!
//! Conversion between the major units a browser client sends and the
//! smallest units the provider API expects.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217). Card payments are taken in USD only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
        }
    }

    /// Convert a decimal amount to cents, rounding half away from zero
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        (amount * 100.0).round() as i64
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_smallest_unit_rounds() {
        assert_eq!(Currency::USD.to_smallest_unit(10.0), 1000);
        assert_eq!(Currency::USD.to_smallest_unit(19.99), 1999);
        assert_eq!(Currency::USD.to_smallest_unit(0.1 + 0.2), 30);
        assert_eq!(Currency::USD.to_smallest_unit(12.345_1), 1235);
    }

    #[test]
    fn test_display_and_wire_code() {
        assert_eq!(Currency::USD.to_string(), "USD");
        assert_eq!(serde_json::to_value(Currency::USD).unwrap(), "usd");
    }
}
