//! Typed GraphQL documents for the Shopee Affiliate API.
//!
//! Every caller-supplied value reaches the query text through [`Arguments`],
//! which quotes and escapes strings and renders numbers and enums from typed
//! fields. Arguments are validated before any text is produced, so an invalid
//! page or limit never costs a request.

use std::fmt::{Display, Write as _};

use afiliado_core::{
    CategoryId, ItemId, OfferSortType, ProductSortType, ShopId, ShopSortType, ShopType,
};
use serde::de::DeserializeOwned;

use crate::error::ShopeeError;
use crate::types::{ConversionReport, OfferPage, ProductOffer, ShopOffer, ShopeeOffer, ShortLink};

/// Query used to check connectivity and credentials.
pub const INTROSPECTION_QUERY: &str = "{ __schema { queryType { name } } }";

/// Largest page size accepted by the `*OfferV2` queries.
pub const MAX_OFFER_LIMIT: u32 = 50;

/// Largest page size accepted by `conversionReport`.
pub const MAX_CONVERSION_LIMIT: u32 = 500;

/// Most `subIds` a short link can carry.
pub const MAX_SUB_IDS: usize = 5;

const PAGE_INFO_SELECTION: &str = "pageInfo { page limit hasNextPage }";

const PRODUCT_OFFER_SELECTION: &str = "nodes { itemId commissionRate sellerCommissionRate \
    shopeeCommissionRate commission sales priceMax priceMin productCatIds ratingStar \
    priceDiscountRate imageUrl productName shopId shopName shopType productLink offerLink \
    periodStartTime periodEndTime }";

const SHOP_OFFER_SELECTION: &str = "nodes { commissionRate imageUrl offerLink originalLink \
    shopId shopName ratingStar shopType remainingBudget periodStartTime periodEndTime \
    sellerCommCoveRatio }";

const SHOPEE_OFFER_SELECTION: &str = "nodes { commissionRate imageUrl offerLink originalLink \
    offerName offerType categoryId collectionId periodStartTime periodEndTime }";

const CONVERSION_SELECTION: &str = "nodes { orderId productId productName commissionAmount \
    orderAmount purchaseTime status } scrollId totalCount";

/// A GraphQL document with a known root field and result type.
///
/// The typed operations in [`AffiliateApi`](crate::operations::AffiliateApi)
/// send [`to_query`](Self::to_query) under [`OPERATION_NAME`](Self::OPERATION_NAME)
/// and decode `data[ROOT_FIELD]` into [`Output`](Self::Output).
pub trait GraphQLOperation {
    /// Decoded value of the root field. `Default` is used when the field is
    /// missing or null.
    type Output: DeserializeOwned + Default;

    /// Operation name declared in the document.
    const OPERATION_NAME: &'static str;

    /// Root field whose value is decoded.
    const ROOT_FIELD: &'static str;

    /// Render the document.
    ///
    /// # Errors
    ///
    /// Returns `ShopeeError::InvalidArgument` if an argument is out of range.
    fn to_query(&self) -> Result<String, ShopeeError>;
}

// =============================================================================
// Argument rendering
// =============================================================================

/// Quote `value` as a GraphQL string literal.
///
/// Escapes quotes, backslashes and control characters so the value cannot
/// terminate the literal early.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Comma-separated `name:value` argument list.
#[derive(Debug, Default)]
struct Arguments(Vec<String>);

impl Arguments {
    fn string(&mut self, name: &str, value: &str) -> &mut Self {
        self.0.push(format!("{name}:{}", quote(value)));
        self
    }

    fn scalar(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.0.push(format!("{name}:{value}"));
        self
    }

    fn optional_scalar<T: Display>(&mut self, name: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.scalar(name, value);
        }
        self
    }

    fn keyword(&mut self, value: Option<&str>) -> &mut Self {
        if let Some(keyword) = value.map(str::trim).filter(|k| !k.is_empty()) {
            self.string("keyword", keyword);
        }
        self
    }

    fn list<T: Display>(&mut self, name: &str, values: impl IntoIterator<Item = T>) -> &mut Self {
        let rendered: Vec<String> = values.into_iter().map(|v| v.to_string()).collect();
        self.0.push(format!("{name}:[{}]", rendered.join(",")));
        self
    }

    fn render(&self) -> String {
        if self.0.is_empty() {
            String::new()
        } else {
            format!("({})", self.0.join(","))
        }
    }
}

fn validate_page(page: u32) -> Result<(), ShopeeError> {
    if page == 0 {
        return Err(ShopeeError::InvalidArgument(
            "page must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_limit(limit: u32, max: u32) -> Result<(), ShopeeError> {
    if limit == 0 || limit > max {
        return Err(ShopeeError::InvalidArgument(format!(
            "limit must be between 1 and {max}, got {limit}"
        )));
    }
    Ok(())
}

// =============================================================================
// productOfferV2
// =============================================================================

/// Product offer search (`productOfferV2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSearch {
    keyword: Option<String>,
    shop_id: Option<ShopId>,
    item_id: Option<ItemId>,
    product_cat_id: Option<CategoryId>,
    sort_type: ProductSortType,
    page: u32,
    limit: u32,
    is_ams_offer: Option<bool>,
    is_key_seller: Option<bool>,
}

impl Default for ProductSearch {
    fn default() -> Self {
        Self {
            keyword: None,
            shop_id: None,
            item_id: None,
            product_cat_id: None,
            sort_type: ProductSortType::default(),
            page: 1,
            limit: 20,
            is_ams_offer: None,
            is_key_seller: None,
        }
    }
}

impl ProductSearch {
    /// Search with default sort (highest commission), page 1, 20 per page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    #[must_use]
    pub const fn shop_id(mut self, shop_id: ShopId) -> Self {
        self.shop_id = Some(shop_id);
        self
    }

    #[must_use]
    pub const fn item_id(mut self, item_id: ItemId) -> Self {
        self.item_id = Some(item_id);
        self
    }

    #[must_use]
    pub const fn category(mut self, category: CategoryId) -> Self {
        self.product_cat_id = Some(category);
        self
    }

    #[must_use]
    pub const fn sort_type(mut self, sort_type: ProductSortType) -> Self {
        self.sort_type = sort_type;
        self
    }

    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict to offers with an extra seller-funded (AMS) commission.
    #[must_use]
    pub const fn ams_offer(mut self, is_ams_offer: bool) -> Self {
        self.is_ams_offer = Some(is_ams_offer);
        self
    }

    #[must_use]
    pub const fn key_seller(mut self, is_key_seller: bool) -> Self {
        self.is_key_seller = Some(is_key_seller);
        self
    }
}

impl GraphQLOperation for ProductSearch {
    type Output = OfferPage<ProductOffer>;
    const OPERATION_NAME: &'static str = "ProductOffers";
    const ROOT_FIELD: &'static str = "productOfferV2";

    fn to_query(&self) -> Result<String, ShopeeError> {
        validate_page(self.page)?;
        validate_limit(self.limit, MAX_OFFER_LIMIT)?;

        let mut args = Arguments::default();
        args.keyword(self.keyword.as_deref())
            .optional_scalar("shopId", self.shop_id)
            .optional_scalar("itemId", self.item_id)
            .optional_scalar("productCatId", self.product_cat_id)
            .scalar("sortType", self.sort_type.as_i32())
            .scalar("page", self.page)
            .scalar("limit", self.limit)
            .optional_scalar("isAMSOffer", self.is_ams_offer)
            .optional_scalar("isKeySeller", self.is_key_seller);

        Ok(format!(
            "query {} {{ {}{} {{ {PRODUCT_OFFER_SELECTION} {PAGE_INFO_SELECTION} }} }}",
            Self::OPERATION_NAME,
            Self::ROOT_FIELD,
            args.render()
        ))
    }
}

// =============================================================================
// shopOfferV2
// =============================================================================

/// Shop offer search (`shopOfferV2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSearch {
    shop_id: Option<ShopId>,
    keyword: Option<String>,
    shop_types: Vec<ShopType>,
    is_key_seller: Option<bool>,
    sort_type: ShopSortType,
    page: u32,
    limit: u32,
}

impl Default for ShopSearch {
    fn default() -> Self {
        Self {
            shop_id: None,
            keyword: None,
            shop_types: Vec::new(),
            is_key_seller: None,
            sort_type: ShopSortType::default(),
            page: 1,
            limit: 10,
        }
    }
}

impl ShopSearch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn shop_id(mut self, shop_id: ShopId) -> Self {
        self.shop_id = Some(shop_id);
        self
    }

    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Add a shop type filter. Repeated calls widen the filter.
    #[must_use]
    pub fn shop_type(mut self, shop_type: ShopType) -> Self {
        if !self.shop_types.contains(&shop_type) {
            self.shop_types.push(shop_type);
        }
        self
    }

    #[must_use]
    pub const fn key_seller(mut self, is_key_seller: bool) -> Self {
        self.is_key_seller = Some(is_key_seller);
        self
    }

    #[must_use]
    pub const fn sort_type(mut self, sort_type: ShopSortType) -> Self {
        self.sort_type = sort_type;
        self
    }

    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl GraphQLOperation for ShopSearch {
    type Output = OfferPage<ShopOffer>;
    const OPERATION_NAME: &'static str = "ShopOffers";
    const ROOT_FIELD: &'static str = "shopOfferV2";

    fn to_query(&self) -> Result<String, ShopeeError> {
        validate_page(self.page)?;
        validate_limit(self.limit, MAX_OFFER_LIMIT)?;

        let mut args = Arguments::default();
        args.optional_scalar("shopId", self.shop_id)
            .keyword(self.keyword.as_deref());
        if !self.shop_types.is_empty() {
            args.list("shopType", self.shop_types.iter().map(ShopType::as_i32));
        }
        args.optional_scalar("isKeySeller", self.is_key_seller)
            .scalar("sortType", self.sort_type.as_i32())
            .scalar("page", self.page)
            .scalar("limit", self.limit);

        Ok(format!(
            "query {} {{ {}{} {{ {SHOP_OFFER_SELECTION} {PAGE_INFO_SELECTION} }} }}",
            Self::OPERATION_NAME,
            Self::ROOT_FIELD,
            args.render()
        ))
    }
}

// =============================================================================
// shopeeOfferV2
// =============================================================================

/// Campaign and collection offer search (`shopeeOfferV2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferSearch {
    keyword: Option<String>,
    sort_type: OfferSortType,
    page: u32,
    limit: u32,
}

impl Default for OfferSearch {
    fn default() -> Self {
        Self {
            keyword: None,
            sort_type: OfferSortType::default(),
            page: 1,
            limit: 10,
        }
    }
}

impl OfferSearch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    #[must_use]
    pub const fn sort_type(mut self, sort_type: OfferSortType) -> Self {
        self.sort_type = sort_type;
        self
    }

    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl GraphQLOperation for OfferSearch {
    type Output = OfferPage<ShopeeOffer>;
    const OPERATION_NAME: &'static str = "ShopeeOffers";
    const ROOT_FIELD: &'static str = "shopeeOfferV2";

    fn to_query(&self) -> Result<String, ShopeeError> {
        validate_page(self.page)?;
        validate_limit(self.limit, MAX_OFFER_LIMIT)?;

        let mut args = Arguments::default();
        args.keyword(self.keyword.as_deref())
            .scalar("sortType", self.sort_type.as_i32())
            .scalar("page", self.page)
            .scalar("limit", self.limit);

        Ok(format!(
            "query {} {{ {}{} {{ {SHOPEE_OFFER_SELECTION} {PAGE_INFO_SELECTION} }} }}",
            Self::OPERATION_NAME,
            Self::ROOT_FIELD,
            args.render()
        ))
    }
}

// =============================================================================
// generateShortLink
// =============================================================================

/// Affiliate short link generation (`generateShortLink` mutation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLinkRequest {
    origin_url: String,
    sub_ids: Vec<String>,
}

impl ShortLinkRequest {
    /// Short link for `origin_url`, which must be an absolute http(s) URL.
    #[must_use]
    pub fn new(origin_url: impl Into<String>) -> Self {
        Self {
            origin_url: origin_url.into(),
            sub_ids: Vec::new(),
        }
    }

    /// Attach a tracking sub ID. Only the first five are sent.
    #[must_use]
    pub fn sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_ids.push(sub_id.into());
        self
    }

    #[must_use]
    pub fn sub_ids<I, S>(mut self, sub_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sub_ids.extend(sub_ids.into_iter().map(Into::into));
        self
    }
}

impl GraphQLOperation for ShortLinkRequest {
    type Output = Option<ShortLink>;
    const OPERATION_NAME: &'static str = "GenerateShortLink";
    const ROOT_FIELD: &'static str = "generateShortLink";

    fn to_query(&self) -> Result<String, ShopeeError> {
        let url = url::Url::parse(&self.origin_url).map_err(|e| {
            ShopeeError::InvalidArgument(format!("invalid origin URL '{}': {e}", self.origin_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ShopeeError::InvalidArgument(format!(
                "origin URL must be http(s), got '{}'",
                url.scheme()
            )));
        }

        if self.sub_ids.len() > MAX_SUB_IDS {
            tracing::warn!(
                given = self.sub_ids.len(),
                kept = MAX_SUB_IDS,
                "Too many subIds for short link; extra ones dropped"
            );
        }

        let mut input = Arguments::default();
        input.string("originUrl", &self.origin_url);
        if !self.sub_ids.is_empty() {
            input.list(
                "subIds",
                self.sub_ids.iter().take(MAX_SUB_IDS).map(|s| quote(s)),
            );
        }

        Ok(format!(
            "mutation {} {{ {}(input:{{{}}}) {{ shortLink }} }}",
            Self::OPERATION_NAME,
            Self::ROOT_FIELD,
            input.0.join(",")
        ))
    }
}

// =============================================================================
// conversionReport
// =============================================================================

/// Conversion report query (`conversionReport`).
///
/// Pages are chained through `scrollId`; see
/// [`fetch_all_conversions`](crate::paginator::fetch_all_conversions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReportRequest {
    purchase_time_start: i64,
    purchase_time_end: i64,
    scroll_id: Option<String>,
    limit: Option<u32>,
}

impl ConversionReportRequest {
    /// Report for purchases between two unix timestamps (seconds, inclusive).
    #[must_use]
    pub const fn new(purchase_time_start: i64, purchase_time_end: i64) -> Self {
        Self {
            purchase_time_start,
            purchase_time_end,
            scroll_id: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn scroll_id(mut self, scroll_id: impl Into<String>) -> Self {
        self.scroll_id = Some(scroll_id.into());
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Same range, continuing from `scroll_id` (or from the start when `None`).
    #[must_use]
    pub fn with_scroll_id(&self, scroll_id: Option<String>) -> Self {
        Self {
            scroll_id,
            ..self.clone()
        }
    }

    #[must_use]
    pub const fn purchase_time_start(&self) -> i64 {
        self.purchase_time_start
    }

    #[must_use]
    pub const fn purchase_time_end(&self) -> i64 {
        self.purchase_time_end
    }
}

impl GraphQLOperation for ConversionReportRequest {
    type Output = ConversionReport;
    const OPERATION_NAME: &'static str = "ConversionReport";
    const ROOT_FIELD: &'static str = "conversionReport";

    fn to_query(&self) -> Result<String, ShopeeError> {
        if self.purchase_time_start > self.purchase_time_end {
            return Err(ShopeeError::InvalidArgument(format!(
                "purchase time range is reversed: {} > {}",
                self.purchase_time_start, self.purchase_time_end
            )));
        }
        if let Some(limit) = self.limit {
            validate_limit(limit, MAX_CONVERSION_LIMIT)?;
        }

        let mut args = Arguments::default();
        args.scalar("purchaseTimeStart", self.purchase_time_start)
            .scalar("purchaseTimeEnd", self.purchase_time_end);
        if let Some(scroll_id) = self.scroll_id.as_deref() {
            args.string("scrollId", scroll_id);
        }
        args.optional_scalar("limit", self.limit);

        Ok(format!(
            "query {} {{ {}{} {{ {CONVERSION_SELECTION} }} }}",
            Self::OPERATION_NAME,
            Self::ROOT_FIELD,
            args.render()
        ))
    }
}
