//! Typed operations end to end.

#![allow(clippy::unwrap_used)]

use afiliado_core::{ConversionStatus, ItemId, ProductSortType, ShopType};
use afiliado_integration_tests::MockShopee;
use afiliado_shopee::{
    AffiliateApi, ConversionReportRequest, OfferSearch, ProductSearch, ShopSearch,
    ShortLinkRequest,
};
use serde_json::json;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_partial_json;

#[tokio::test]
async fn test_search_products() {
    let shopee = MockShopee::start().await;
    MockShopee::signed_post()
        .and(body_partial_json(json!({"operationName": "ProductOffers"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "productOfferV2": {
                    "nodes": [{
                        "itemId": 22_719_284_903_i64,
                        "productName": "Fone Bluetooth TWS",
                        "commissionRate": "0.12",
                        "priceMin": "39.90",
                        "offerLink": "https://s.shopee.com.br/abc"
                    }],
                    "pageInfo": {"page": 1, "limit": 1, "hasNextPage": true}
                }
            }
        })))
        .expect(1)
        .mount(&shopee.server)
        .await;

    let page = shopee
        .client()
        .search_products(
            &ProductSearch::new()
                .keyword("fone bluetooth")
                .sort_type(ProductSortType::ItemSoldDesc)
                .limit(1),
        )
        .await
        .unwrap();

    assert!(page.has_next_page());
    let offer = page.nodes.first().unwrap();
    assert_eq!(offer.item_id, Some(ItemId::new(22_719_284_903)));
    assert_eq!(offer.commission_rate.unwrap().to_string(), "12%");

    let bodies = shopee.received_bodies().await;
    let query = bodies[0]["query"].as_str().unwrap();
    assert!(query.contains(r#"keyword:"fone bluetooth""#));
    assert!(query.contains("sortType:2"));
    assert!(query.contains("limit:1"));
}

#[tokio::test]
async fn test_search_shops_and_offers() {
    let shopee = MockShopee::start().await;
    shopee
        .respond_with_data(json!({
            "shopOfferV2": {
                "nodes": [{"shopId": 1, "shopName": "Loja Oficial", "shopType": [1]}],
                "pageInfo": {"page": 1, "limit": 10, "hasNextPage": false}
            },
            "shopeeOfferV2": {
                "nodes": [{"offerName": "Black Friday", "offerType": 1}],
                "pageInfo": {"page": 1, "limit": 10, "hasNextPage": false}
            }
        }))
        .await;
    let client = shopee.client();

    let shops = client
        .search_shops(&ShopSearch::new().shop_type(ShopType::Official))
        .await
        .unwrap();
    assert_eq!(shops.nodes.len(), 1);
    assert_eq!(shops.nodes[0].shop_name.as_deref(), Some("Loja Oficial"));

    let offers = client.search_offers(&OfferSearch::new()).await.unwrap();
    assert_eq!(offers.nodes[0].offer_name.as_deref(), Some("Black Friday"));
}

#[tokio::test]
async fn test_generate_short_link() {
    let shopee = MockShopee::start().await;
    shopee
        .respond_with_data(json!({
            "generateShortLink": {"shortLink": "https://s.shopee.com.br/2fJk"}
        }))
        .await;

    let link = shopee
        .client()
        .generate_short_link(
            &ShortLinkRequest::new("https://shopee.com.br/product/1/2").sub_id("telegram"),
        )
        .await
        .unwrap();
    assert_eq!(link.unwrap().short_link, "https://s.shopee.com.br/2fJk");

    let bodies = shopee.received_bodies().await;
    assert_eq!(bodies[0]["operationName"], "GenerateShortLink");
    assert!(
        bodies[0]["query"]
            .as_str()
            .unwrap()
            .starts_with("mutation GenerateShortLink")
    );
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_server() {
    let shopee = MockShopee::start().await;
    shopee.respond_with_data(json!({})).await;
    let client = shopee.client();

    assert!(client.search_products(&ProductSearch::new().limit(0)).await.is_err());
    assert!(
        client
            .generate_short_link(&ShortLinkRequest::new("javascript:alert(1)"))
            .await
            .is_err()
    );
    assert!(
        client
            .get_conversion_report(&ConversionReportRequest::new(100, 1))
            .await
            .is_err()
    );
    assert!(shopee.received_bodies().await.is_empty());
}

#[tokio::test]
async fn test_conversion_report_page() {
    let shopee = MockShopee::start().await;
    shopee
        .respond_with_data(json!({
            "conversionReport": {
                "nodes": [
                    {"orderId": "A", "status": "COMPLETED", "commissionAmount": "1.20"},
                    {"orderId": "B", "status": "CANCELLED"}
                ],
                "scrollId": "next",
                "totalCount": 2
            }
        }))
        .await;

    let report = shopee
        .client()
        .get_conversion_report(&ConversionReportRequest::new(1_704_067_200, 1_706_745_599))
        .await
        .unwrap();
    assert_eq!(report.nodes.len(), 2);
    assert_eq!(report.nodes[1].status, ConversionStatus::Cancelled);
    assert_eq!(report.scroll_id.as_deref(), Some("next"));
}
