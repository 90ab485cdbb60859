//! Typed operations on any [`GraphQLExecutor`].
//!
//! Provided as default methods of [`AffiliateApi`], which is implemented for
//! every executor. Calling them on a [`RateLimited`](crate::RateLimited)
//! wrapper therefore routes each request through the limiter.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use crate::client::GraphQLExecutor;
use crate::error::ShopeeError;
use crate::queries::{
    ConversionReportRequest, GraphQLOperation, INTROSPECTION_QUERY, OfferSearch, ProductSearch,
    ShopSearch, ShortLinkRequest,
};
use crate::types::{ConversionReport, OfferPage, ProductOffer, ShopOffer, ShopeeOffer, ShortLink};

/// Shopee Affiliate API operations.
#[async_trait]
pub trait AffiliateApi: GraphQLExecutor {
    /// Send a typed operation and decode its root field.
    ///
    /// A missing or null root field decodes to `Output::default()`.
    ///
    /// # Errors
    ///
    /// Returns `ShopeeError::InvalidArgument` before sending if the operation
    /// fails validation, otherwise any error from the executor or from
    /// decoding the root field.
    async fn run<Q>(&self, operation: &Q) -> Result<Q::Output, ShopeeError>
    where
        Q: GraphQLOperation + Sync,
    {
        let query = operation.to_query()?;
        let data = self
            .query_named(&query, None, Some(Q::OPERATION_NAME))
            .await?;
        decode_field(data, Q::ROOT_FIELD)
    }

    /// Search product offers.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    #[instrument(skip(self))]
    async fn search_products(
        &self,
        search: &ProductSearch,
    ) -> Result<OfferPage<ProductOffer>, ShopeeError> {
        let page = self.run(search).await?;
        tracing::info!(
            count = page.nodes.len(),
            has_next_page = page.has_next_page(),
            "Product offers fetched"
        );
        Ok(page)
    }

    /// Search shop offers.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    #[instrument(skip(self))]
    async fn search_shops(&self, search: &ShopSearch) -> Result<OfferPage<ShopOffer>, ShopeeError> {
        let page = self.run(search).await?;
        tracing::info!(
            count = page.nodes.len(),
            has_next_page = page.has_next_page(),
            "Shop offers fetched"
        );
        Ok(page)
    }

    /// Search Shopee campaign and collection offers.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    #[instrument(skip(self))]
    async fn search_offers(
        &self,
        search: &OfferSearch,
    ) -> Result<OfferPage<ShopeeOffer>, ShopeeError> {
        let page = self.run(search).await?;
        tracing::info!(
            count = page.nodes.len(),
            has_next_page = page.has_next_page(),
            "Shopee offers fetched"
        );
        Ok(page)
    }

    /// Generate an affiliate short link. `Ok(None)` when the API returned no
    /// link.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    #[instrument(skip(self))]
    async fn generate_short_link(
        &self,
        request: &ShortLinkRequest,
    ) -> Result<Option<ShortLink>, ShopeeError> {
        let link = self.run(request).await?;
        match &link {
            Some(link) => tracing::info!(short_link = %link.short_link, "Short link generated"),
            None => tracing::warn!("Short link response had no link"),
        }
        Ok(link)
    }

    /// Fetch one page of the conversion report.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    #[instrument(skip(self))]
    async fn get_conversion_report(
        &self,
        request: &ConversionReportRequest,
    ) -> Result<ConversionReport, ShopeeError> {
        let report = self.run(request).await?;
        tracing::info!(
            count = report.nodes.len(),
            total_count = report.total_count,
            has_scroll_id = report.scroll_id.is_some(),
            "Conversion report page fetched"
        );
        Ok(report)
    }

    /// Check that the endpoint answers a signed introspection query.
    ///
    /// Never fails: any error is logged and reported as `false`.
    async fn test_connection(&self) -> bool {
        match self.query(INTROSPECTION_QUERY, None).await {
            Ok(data) if !data.is_null() => {
                tracing::info!("Shopee connection OK");
                true
            }
            Ok(_) => {
                tracing::error!("Shopee introspection returned no data");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, auth = e.is_auth(), "Shopee connection test failed");
                false
            }
        }
    }
}

impl<E: GraphQLExecutor + ?Sized> AffiliateApi for E {}

/// Decode `data[field]`, treating a missing or null field as the default.
fn decode_field<T>(mut data: Value, field: &str) -> Result<T, ShopeeError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match data.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::json;

    /// Executor returning canned `data` values and recording what it was sent.
    struct Canned {
        responses: Mutex<Vec<Result<Value, ShopeeError>>>,
        sent: Mutex<Vec<(String, Option<String>)>>,
    }

    impl Canned {
        fn new(responses: Vec<Result<Value, ShopeeError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GraphQLExecutor for Canned {
        async fn query_named(
            &self,
            query: &str,
            _variables: Option<Value>,
            operation_name: Option<&str>,
        ) -> Result<Value, ShopeeError> {
            self.sent
                .lock()
                .unwrap()
                .push((query.to_string(), operation_name.map(str::to_string)));
            self.responses.lock().unwrap().remove(0)
        }
    }

    #[tokio::test]
    async fn test_search_products_decodes_page() {
        let api = Canned::new(vec![Ok(json!({
            "productOfferV2": {
                "nodes": [{"itemId": 1, "productName": "A"}, {"itemId": 2}],
                "pageInfo": {"page": 1, "limit": 2, "hasNextPage": true}
            }
        }))]);

        let page = api
            .search_products(&ProductSearch::new().keyword("a").limit(2))
            .await
            .unwrap();

        assert_eq!(page.nodes.len(), 2);
        assert!(page.has_next_page());
        let sent = api.sent.lock().unwrap();
        assert_eq!(sent[0].1.as_deref(), Some("ProductOffers"));
        assert!(sent[0].0.contains(r#"keyword:"a""#));
    }

    #[tokio::test]
    async fn test_null_root_field_is_empty_page() {
        let api = Canned::new(vec![Ok(json!({"shopOfferV2": null}))]);
        let page = api.search_shops(&ShopSearch::new()).await.unwrap();
        assert!(page.nodes.is_empty());
    }

    #[tokio::test]
    async fn test_short_link_missing_is_none() {
        let api = Canned::new(vec![Ok(Value::Null)]);
        let link = api
            .generate_short_link(&ShortLinkRequest::new("https://shopee.com.br/x"))
            .await
            .unwrap();
        assert!(link.is_none());
    }

    #[tokio::test]
    async fn test_short_link_decoded() {
        let api = Canned::new(vec![Ok(json!({
            "generateShortLink": {"shortLink": "https://s.shopee.com.br/1"}
        }))]);
        let link = api
            .generate_short_link(&ShortLinkRequest::new("https://shopee.com.br/x"))
            .await
            .unwrap();
        assert_eq!(link.unwrap().short_link, "https://s.shopee.com.br/1");
    }

    #[tokio::test]
    async fn test_invalid_argument_sends_nothing() {
        let api = Canned::new(vec![]);
        let err = api
            .search_offers(&OfferSearch::new().page(0))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopeeError::InvalidArgument(_)));
        assert!(api.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_root_field_is_parse_error() {
        let api = Canned::new(vec![Ok(json!({"conversionReport": {"nodes": "oops"}}))]);
        let err = api
            .get_conversion_report(&ConversionReportRequest::new(0, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopeeError::Parse(_)));
    }

    #[tokio::test]
    async fn test_connection_check() {
        let ok = Canned::new(vec![Ok(json!({"__schema": {"queryType": {"name": "Query"}}}))]);
        assert!(ok.test_connection().await);

        let empty = Canned::new(vec![Ok(Value::Null)]);
        assert!(!empty.test_connection().await);

        let failed = Canned::new(vec![Err(ShopeeError::Auth("Invalid Signature".to_string()))]);
        assert!(!failed.test_connection().await);
    }
}
