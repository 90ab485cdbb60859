//! Commission rate as reported by the affiliate API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Commission rate expressed as a fraction (`0.05` means 5%).
///
/// The Shopee API returns rates as decimal strings such as `"0.05"`; the
/// default `Decimal` deserializer accepts both string and numeric forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CommissionRate(Decimal);

impl CommissionRate {
    /// Create a commission rate from a fraction.
    #[must_use]
    pub const fn new(fraction: Decimal) -> Self {
        Self(fraction)
    }

    /// The raw fraction (`0.05` for 5%).
    #[must_use]
    pub const fn as_fraction(&self) -> Decimal {
        self.0
    }

    /// The rate as a percentage (`5` for `0.05`).
    #[must_use]
    pub fn as_percent(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }
}

impl std::fmt::Display for CommissionRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}
