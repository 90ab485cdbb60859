//! Sort orders and shop classifications accepted by the affiliate API.
//!
//! The Shopee GraphQL API takes these as bare integers; the enums here keep
//! callers from sending a value the endpoint does not understand.

use serde::{Deserialize, Serialize};

/// Error returned when parsing a sort or shop type from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseKindError {
    kind: &'static str,
    value: String,
}

impl ParseKindError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Sort order for `productOfferV2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortType {
    /// Relevance to the keyword (only meaningful with a keyword).
    RelevanceDesc,
    /// Most sold first.
    ItemSoldDesc,
    /// Highest price first.
    PriceDesc,
    /// Lowest price first.
    PriceAsc,
    /// Highest commission first.
    #[default]
    CommissionDesc,
}

impl ProductSortType {
    /// Wire value sent as `sortType`.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::RelevanceDesc => 1,
            Self::ItemSoldDesc => 2,
            Self::PriceDesc => 3,
            Self::PriceAsc => 4,
            Self::CommissionDesc => 5,
        }
    }
}

impl std::str::FromStr for ProductSortType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" | "1" => Ok(Self::RelevanceDesc),
            "sales" | "2" => Ok(Self::ItemSoldDesc),
            "price_desc" | "3" => Ok(Self::PriceDesc),
            "price_asc" | "4" => Ok(Self::PriceAsc),
            "commission" | "5" => Ok(Self::CommissionDesc),
            _ => Err(ParseKindError::new("product sort type", s)),
        }
    }
}

/// Sort order for `shopOfferV2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShopSortType {
    /// Most recently added first.
    LatestDesc,
    /// Highest commission first.
    #[default]
    HighestCommissionDesc,
    /// Most popular shops first.
    PopularShopDesc,
}

impl ShopSortType {
    /// Wire value sent as `sortType`.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::LatestDesc => 1,
            Self::HighestCommissionDesc => 2,
            Self::PopularShopDesc => 3,
        }
    }
}

impl std::str::FromStr for ShopSortType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" | "1" => Ok(Self::LatestDesc),
            "commission" | "2" => Ok(Self::HighestCommissionDesc),
            "popular" | "3" => Ok(Self::PopularShopDesc),
            _ => Err(ParseKindError::new("shop sort type", s)),
        }
    }
}

/// Sort order for `shopeeOfferV2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OfferSortType {
    /// Most recently added first.
    #[default]
    LatestDesc,
    /// Highest commission first.
    HighestCommissionDesc,
}

impl OfferSortType {
    /// Wire value sent as `sortType`.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::LatestDesc => 1,
            Self::HighestCommissionDesc => 2,
        }
    }
}

impl std::str::FromStr for OfferSortType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" | "1" => Ok(Self::LatestDesc),
            "commission" | "2" => Ok(Self::HighestCommissionDesc),
            _ => Err(ParseKindError::new("offer sort type", s)),
        }
    }
}

/// Shop classification used by the `shopType` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopType {
    /// Shopee Mall.
    Official,
    /// Star seller.
    Preferred,
    /// Star+ seller.
    PreferredPlus,
}

impl ShopType {
    /// Wire value sent inside `shopType: [...]`.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::Official => 1,
            Self::Preferred => 2,
            Self::PreferredPlus => 4,
        }
    }
}

impl std::str::FromStr for ShopType {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "official" | "mall" | "1" => Ok(Self::Official),
            "preferred" | "star" | "2" => Ok(Self::Preferred),
            "preferred_plus" | "star_plus" | "4" => Ok(Self::PreferredPlus),
            _ => Err(ParseKindError::new("shop type", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_sort_wire_values() {
        assert_eq!(ProductSortType::RelevanceDesc.as_i32(), 1);
        assert_eq!(ProductSortType::default().as_i32(), 5);
    }

    #[test]
    fn test_shop_type_skips_three() {
        assert_eq!(ShopType::PreferredPlus.as_i32(), 4);
        assert_eq!("star_plus".parse::<ShopType>().unwrap(), ShopType::PreferredPlus);
    }

    #[test]
    fn test_parse_accepts_numeric_form() {
        assert_eq!("2".parse::<ShopSortType>().unwrap(), ShopSortType::HighestCommissionDesc);
        assert_eq!("2".parse::<OfferSortType>().unwrap(), OfferSortType::HighestCommissionDesc);
    }

    #[test]
    fn test_parse_error_message() {
        let err = "cheapest".parse::<ProductSortType>().unwrap_err();
        assert_eq!(err.to_string(), "invalid product sort type: cheapest");
    }
}
