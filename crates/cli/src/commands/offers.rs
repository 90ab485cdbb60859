//! Offer searches.

use afiliado_shopee::{AffiliateApi, OfferSearch, ProductSearch, ShopSearch};

/// Search product offers and print the page.
pub async fn products<A: AffiliateApi>(
    api: &A,
    search: &ProductSearch,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = api.search_products(search).await?;
    super::write_json(&page)?;
    Ok(())
}

/// Search shop offers and print the page.
pub async fn shops<A: AffiliateApi>(
    api: &A,
    search: &ShopSearch,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = api.search_shops(search).await?;
    super::write_json(&page)?;
    Ok(())
}

/// Search campaign and collection offers and print the page.
pub async fn offers<A: AffiliateApi>(
    api: &A,
    search: &OfferSearch,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = api.search_offers(search).await?;
    super::write_json(&page)?;
    Ok(())
}
