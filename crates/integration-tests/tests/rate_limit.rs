//! Rate-limited client against the mock endpoint.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use afiliado_integration_tests::MockShopee;
use afiliado_shopee::{
    AffiliateApi, GraphQLExecutor, ProductSearch, RateLimitConfig, RateLimited, RateLimiter,
    ShopeeClient,
};
use serde_json::json;

#[tokio::test]
async fn test_wrapper_counts_every_request() {
    let shopee = MockShopee::start().await;
    shopee
        .respond_with_data(json!({"productOfferV2": {"nodes": [], "pageInfo": {}}}))
        .await;

    let config = shopee.config().with_rate_limit(RateLimitConfig {
        max_requests: 10,
        window: Duration::from_secs(3600),
    });
    let api = RateLimited::from_config(ShopeeClient::new(&config), &config);

    api.query("{a}", None).await.unwrap();
    api.search_products(&ProductSearch::new()).await.unwrap();
    api.test_connection().await;

    let status = api.status();
    assert_eq!(status.used, 3);
    assert_eq!(status.remaining, 7);
    assert_eq!(status.total, 10);
    assert_eq!(shopee.received_bodies().await.len(), 3);
}

#[tokio::test]
async fn test_wrapper_waits_when_window_full() {
    let shopee = MockShopee::start().await;
    shopee.respond_with_data(json!({"ok": true})).await;

    let window = Duration::from_millis(400);
    let limiter = Arc::new(RateLimiter::new(2, window).with_margin(Duration::ZERO));
    let api = RateLimited::new(shopee.client(), limiter);

    let start = Instant::now();
    api.query("{ok}", None).await.unwrap();
    api.query("{ok}", None).await.unwrap();
    api.query("{ok}", None).await.unwrap();

    assert!(start.elapsed() >= window);
    assert_eq!(shopee.received_bodies().await.len(), 3);
}

#[tokio::test]
async fn test_failed_requests_still_spend_budget() {
    let shopee = MockShopee::start().await;
    // Nothing mounted: wiremock answers 404
    let api = RateLimited::new(shopee.client(), Arc::new(RateLimiter::new(5, Duration::from_secs(60))));

    let err = api.query("{a}", None).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(api.status().used, 1);
}
