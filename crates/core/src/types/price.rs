//! Type-safe price representation using decimal arithmetic.
//!
//! The affiliate API reports prices as decimal strings (e.g. `"19.90"`) in
//! the marketplace's local currency. Keeping them as [`Decimal`] avoids the
//! float rounding that would otherwise creep into displayed prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Brazilian reais (the Shopee BR marketplace currency).
    #[must_use]
    pub const fn brl(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::BRL)
    }

    /// Format for display (e.g., "R$ 19.90").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {:.2}", self.currency_code.symbol(), self.amount)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes for the marketplaces we aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
}

impl CurrencyCode {
    /// Currency symbol used when formatting prices.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "$",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brl_display() {
        let price = Price::brl(Decimal::new(1990, 2));
        assert_eq!(price.to_string(), "R$ 19.90");
    }

    #[test]
    fn test_display_pads_decimals() {
        let price = Price::new(Decimal::new(5, 0), CurrencyCode::USD);
        assert_eq!(price.display(), "$ 5.00");
    }
}
