//! Short link generation.

use afiliado_shopee::{AffiliateApi, ShortLinkRequest};
use serde_json::json;

/// Generate a short link for `url` and print it (`null` when the API
/// returned none).
pub async fn generate<A: AffiliateApi>(
    api: &A,
    url: &str,
    sub_ids: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = ShortLinkRequest::new(url).sub_ids(sub_ids);
    let link = api.generate_short_link(&request).await?;
    super::write_json(&json!({
        "origin_url": url,
        "short_link": link.map(|l| l.short_link),
    }))?;
    Ok(())
}
