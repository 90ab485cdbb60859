//! Response types for the Shopee Affiliate API.
//!
//! Field names follow the API's camelCase. Nearly every field is optional:
//! the API omits fields it has no value for, and a missing optional column
//! should not fail a whole page of results.

use afiliado_core::{
    CategoryId, CollectionId, CommissionRate, ConversionStatus, ItemId, Price, ShopId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Offset pagination info returned by the `*OfferV2` queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Current page (1-indexed).
    #[serde(default)]
    pub page: u32,
    /// Page size.
    #[serde(default)]
    pub limit: u32,
    /// Whether another page exists.
    #[serde(default)]
    pub has_next_page: bool,
}

/// A page of offers of some kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPage<T> {
    /// Offers on this page.
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
    /// Pagination info.
    #[serde(default)]
    pub page_info: PageInfo,
}

impl<T> Default for OfferPage<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            page_info: PageInfo::default(),
        }
    }
}

impl<T> OfferPage<T> {
    /// Whether the API reported another page after this one.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.page_info.has_next_page
    }
}

/// A product offer from `productOfferV2`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOffer {
    pub item_id: Option<ItemId>,
    pub product_name: Option<String>,
    pub commission_rate: Option<CommissionRate>,
    pub seller_commission_rate: Option<CommissionRate>,
    pub shopee_commission_rate: Option<CommissionRate>,
    /// Commission amount per sale at the current price.
    pub commission: Option<Decimal>,
    pub sales: Option<i64>,
    pub price_max: Option<Decimal>,
    pub price_min: Option<Decimal>,
    #[serde(default)]
    pub product_cat_ids: Vec<i64>,
    pub rating_star: Option<Decimal>,
    /// Discount off the original price, in percent.
    pub price_discount_rate: Option<Decimal>,
    pub image_url: Option<String>,
    pub shop_id: Option<ShopId>,
    pub shop_name: Option<String>,
    #[serde(default)]
    pub shop_type: Vec<i32>,
    pub product_link: Option<String>,
    /// Affiliate tracking link.
    pub offer_link: Option<String>,
    pub period_start_time: Option<i64>,
    pub period_end_time: Option<i64>,
}

impl ProductOffer {
    /// Lowest listed price in BRL.
    #[must_use]
    pub fn min_price(&self) -> Option<Price> {
        self.price_min.map(Price::brl)
    }

    /// Highest listed price in BRL.
    #[must_use]
    pub fn max_price(&self) -> Option<Price> {
        self.price_max.map(Price::brl)
    }
}

/// A shop offer from `shopOfferV2`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopOffer {
    pub shop_id: Option<ShopId>,
    pub shop_name: Option<String>,
    pub commission_rate: Option<CommissionRate>,
    pub image_url: Option<String>,
    pub offer_link: Option<String>,
    pub original_link: Option<String>,
    pub rating_star: Option<Decimal>,
    #[serde(default)]
    pub shop_type: Vec<i32>,
    pub remaining_budget: Option<i64>,
    pub period_start_time: Option<i64>,
    pub period_end_time: Option<i64>,
    /// Share of the commission covered by the seller.
    pub seller_comm_cove_ratio: Option<Decimal>,
}

/// A campaign or collection offer from `shopeeOfferV2`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopeeOffer {
    pub offer_name: Option<String>,
    pub offer_type: Option<i32>,
    pub commission_rate: Option<CommissionRate>,
    pub image_url: Option<String>,
    pub offer_link: Option<String>,
    pub original_link: Option<String>,
    pub category_id: Option<CategoryId>,
    pub collection_id: Option<CollectionId>,
    pub period_start_time: Option<i64>,
    pub period_end_time: Option<i64>,
}

/// A single conversion (attributed order) from `conversionReport`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub order_id: Option<String>,
    pub product_id: Option<ItemId>,
    pub product_name: Option<String>,
    pub commission_amount: Option<Decimal>,
    pub order_amount: Option<Decimal>,
    /// Purchase time as unix seconds.
    pub purchase_time: Option<i64>,
    #[serde(default)]
    pub status: ConversionStatus,
}

impl Conversion {
    /// Purchase time as a UTC timestamp.
    #[must_use]
    pub fn purchased_at(&self) -> Option<DateTime<Utc>> {
        self.purchase_time
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// One page of the conversion report.
///
/// `scroll_id` is the cursor for the next page. It is valid for 30 seconds
/// after the server issues it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    #[serde(default)]
    pub nodes: Vec<Conversion>,
    pub scroll_id: Option<String>,
    #[serde(default)]
    pub total_count: i64,
}

/// Result of `generateShortLink`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub short_link: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_offer_from_api_shape() {
        let offer: ProductOffer = serde_json::from_value(json!({
            "itemId": 22_719_284_903_i64,
            "productName": "Fone Bluetooth TWS",
            "commissionRate": "0.12",
            "priceMin": "39.90",
            "priceMax": "59.90",
            "sales": 1520,
            "productCatIds": [100_013, 100_535],
            "shopId": 345_678,
            "shopType": [1],
            "offerLink": "https://s.shopee.com.br/abc"
        }))
        .unwrap();

        assert_eq!(offer.item_id, Some(ItemId::new(22_719_284_903)));
        assert_eq!(offer.commission_rate.unwrap().to_string(), "12%");
        assert_eq!(offer.min_price().unwrap().to_string(), "R$ 39.90");
        assert_eq!(offer.product_cat_ids.len(), 2);
        assert!(offer.rating_star.is_none());
    }

    #[test]
    fn test_offer_page_defaults_when_fields_missing() {
        let page: OfferPage<ShopOffer> = serde_json::from_value(json!({})).unwrap();
        assert!(page.nodes.is_empty());
        assert!(!page.has_next_page());
    }

    #[test]
    fn test_conversion_report_scroll_id() {
        let report: ConversionReport = serde_json::from_value(json!({
            "nodes": [{
                "orderId": "240101ABC",
                "commissionAmount": "3.50",
                "purchaseTime": 1_704_067_200,
                "status": "COMPLETED"
            }],
            "scrollId": "c2Nyb2xs",
            "totalCount": 42
        }))
        .unwrap();

        assert_eq!(report.scroll_id.as_deref(), Some("c2Nyb2xs"));
        assert_eq!(report.total_count, 42);
        let conversion = report.nodes.first().unwrap();
        assert_eq!(conversion.status, ConversionStatus::Completed);
        assert_eq!(
            conversion.purchased_at().unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }
}
