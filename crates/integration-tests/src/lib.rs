//! Integration tests for Afiliado.
//!
//! The tests run the real client against a `wiremock` server standing in for
//! the Shopee Affiliate endpoint. [`MockShopee`] starts the server and builds
//! clients pointed at it; [`ValidSignature`] only matches requests whose
//! `Authorization` header carries a signature the real API would accept.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p afiliado-integration-tests
//! ```

use afiliado_shopee::signing::sign;
use afiliado_shopee::{ShopeeClient, ShopeeConfig};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// App ID used by every mock client.
pub const APP_ID: &str = "18123456789";

/// App secret used by every mock client.
pub const APP_SECRET: &str = "k3Y9pQ2vX7mN4wR8tL1zB6cF";

/// Path the mock GraphQL endpoint is mounted at.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Largest clock skew Shopee accepts, in seconds.
pub const MAX_CLOCK_SKEW_SECS: i64 = 600;

/// A mock Shopee endpoint.
pub struct MockShopee {
    pub server: MockServer,
}

impl MockShopee {
    /// Start a mock server with nothing mounted.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// GraphQL endpoint URL on the mock server.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}{GRAPHQL_PATH}", self.server.uri())
    }

    /// Configuration pointing at the mock server.
    #[must_use]
    pub fn config(&self) -> ShopeeConfig {
        ShopeeConfig::new(APP_ID, SecretString::from(APP_SECRET)).with_endpoint(self.endpoint())
    }

    /// Client pointing at the mock server.
    #[must_use]
    pub fn client(&self) -> ShopeeClient {
        ShopeeClient::new(&self.config())
    }

    /// Mock builder for signed POSTs to the GraphQL path.
    #[must_use]
    pub fn signed_post() -> wiremock::MockBuilder {
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(ValidSignature::new(APP_ID, APP_SECRET))
    }

    /// Answer every signed request with `{"data": data}`.
    pub async fn respond_with_data(&self, data: Value) {
        Self::signed_post()
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request received so far, parsed as JSON.
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }
}

/// Fields of a Shopee `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationParts {
    pub credential: String,
    pub timestamp: i64,
    pub signature: String,
}

/// Parse `SHA256 Credential=..., Timestamp=..., Signature=...`.
#[must_use]
pub fn parse_authorization(header: &str) -> Option<AuthorizationParts> {
    let fields = header.strip_prefix("SHA256 ")?;
    let mut credential = None;
    let mut timestamp = None;
    let mut signature = None;

    for field in fields.split(", ") {
        let (key, value) = field.split_once('=')?;
        match key {
            "Credential" => credential = Some(value.to_string()),
            "Timestamp" => timestamp = value.parse().ok(),
            "Signature" => signature = Some(value.to_string()),
            _ => return None,
        }
    }

    Some(AuthorizationParts {
        credential: credential?,
        timestamp: timestamp?,
        signature: signature?,
    })
}

/// Matches requests signed with the given credentials over the exact body
/// received, with a timestamp inside the accepted skew.
pub struct ValidSignature {
    app_id: String,
    secret: String,
}

impl ValidSignature {
    #[must_use]
    pub fn new(app_id: &str, secret: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            secret: secret.to_string(),
        }
    }
}

impl Match for ValidSignature {
    fn matches(&self, request: &Request) -> bool {
        let Some(parts) = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_authorization)
        else {
            return false;
        };
        let Ok(body) = std::str::from_utf8(&request.body) else {
            return false;
        };

        let skew = (chrono::Utc::now().timestamp() - parts.timestamp).abs();
        parts.credential == self.app_id
            && skew <= MAX_CLOCK_SKEW_SECS
            && parts.signature == sign(&self.app_id, &self.secret, parts.timestamp, body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authorization() {
        let parts =
            parse_authorization("SHA256 Credential=A1, Timestamp=1000, Signature=abc").unwrap();
        assert_eq!(parts.credential, "A1");
        assert_eq!(parts.timestamp, 1000);
        assert_eq!(parts.signature, "abc");
    }

    #[test]
    fn test_parse_authorization_rejects_other_schemes() {
        assert!(parse_authorization("Bearer token").is_none());
        assert!(parse_authorization("SHA256 Credential=A1, Signature=abc").is_none());
    }
}
