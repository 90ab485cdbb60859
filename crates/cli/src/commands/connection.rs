//! Connectivity check.

use afiliado_shopee::AffiliateApi;
use serde_json::json;
use thiserror::Error;

/// The endpoint did not answer the introspection query.
#[derive(Debug, Error)]
#[error("Shopee connection test failed (see log for details)")]
pub struct ConnectionFailed;

/// Send a signed introspection query and report the outcome.
pub async fn test<A: AffiliateApi>(api: &A) -> Result<(), Box<dyn std::error::Error>> {
    let ok = api.test_connection().await;
    super::write_json(&json!({ "connected": ok }))?;
    if ok {
        Ok(())
    } else {
        Err(ConnectionFailed.into())
    }
}
