//! Quote types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Normalize a user-entered symbol: trimmed, ASCII upper-case.
///
/// Returns `None` when nothing is left after trimming.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

/// A point-in-time price snapshot for one symbol.
///
/// Replaced wholesale on every successful fetch; never merged field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Symbol
    pub symbol: String,
    /// Human-readable instrument name
    pub display_name: String,
    /// Last traded price
    pub price: Decimal,
    /// Change since previous close, in percent
    pub change_percent: Decimal,
    /// Sector, when the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Quote currency, when the provider reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl Quote {
    /// Create a quote with no sector or currency.
    pub fn new(
        symbol: impl Into<String>,
        display_name: impl Into<String>,
        price: Decimal,
        change_percent: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            price,
            change_percent,
            sector: None,
            currency: None,
        }
    }

    /// A quote can back a trade only with a strictly positive price.
    pub fn is_tradable(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl "), Some("AAPL".to_string()));
        assert_eq!(normalize_symbol("brk.b"), Some("BRK.B".to_string()));
        assert_eq!(normalize_symbol("   "), None);
    }

    #[test]
    fn test_quote_tradable() {
        let quote = Quote::new("AAPL", "Apple Inc.", dec!(150), dec!(1.2));
        assert!(quote.is_tradable());

        let zero = Quote::new("XYZ", "Halted", Decimal::ZERO, Decimal::ZERO);
        assert!(!zero.is_tradable());
    }

    #[test]
    fn test_quote_optional_fields_skipped() {
        let quote = Quote::new("MSFT", "Microsoft", dec!(410.5), dec!(-0.4));
        let json = serde_json::to_value(&quote).unwrap();
        assert!(json.get("sector").is_none());

        let back: Quote = serde_json::from_value(json).unwrap();
        assert_eq!(back, quote);
    }
}
