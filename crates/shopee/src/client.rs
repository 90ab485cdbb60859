//! Shopee Affiliate GraphQL client.
//!
//! [`ShopeeClient`] owns the HTTP transport and turns a query plus variables
//! into one signed POST. Response classification:
//!
//! | Response | Result |
//! |---|---|
//! | 401 | [`ShopeeError::Auth`] |
//! | other non-200 | [`ShopeeError::Http`] |
//! | 200, body not JSON | [`ShopeeError::Parse`] |
//! | 200, non-empty `errors` | [`ShopeeError::GraphQL`] |
//! | 200 otherwise | the `data` value (`Null` when absent) |
//!
//! The client never retries. Rate limiting is layered on top by
//! [`RateLimited`](crate::rate_limit::RateLimited), which implements the same
//! [`GraphQLExecutor`] trait.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::config::ShopeeConfig;
use crate::error::{GraphQLError, GraphQLErrorResponse, ShopeeError};
use crate::signing::{Credentials, SignedRequest};

/// Anything that can execute a Shopee GraphQL operation.
///
/// Implemented by [`ShopeeClient`] and by decorators around it. The typed
/// operations in [`AffiliateApi`](crate::operations::AffiliateApi) are
/// provided for every implementor.
#[async_trait]
pub trait GraphQLExecutor: Send + Sync {
    /// Execute `query` with optional variables and operation name, returning
    /// the response's `data` value.
    async fn query_named(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: Option<&str>,
    ) -> Result<Value, ShopeeError>;

    /// Execute `query` with optional variables.
    async fn query(&self, query: &str, variables: Option<Value>) -> Result<Value, ShopeeError> {
        self.query_named(query, variables, None).await
    }
}

#[async_trait]
impl<E: GraphQLExecutor + ?Sized> GraphQLExecutor for Arc<E> {
    async fn query_named(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: Option<&str>,
    ) -> Result<Value, ShopeeError> {
        (**self).query_named(query, variables, operation_name).await
    }
}

/// Request payload. Serialized once; the resulting string is both signed and
/// sent.
#[derive(Debug, Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    operation_name: Option<&'a str>,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLErrorResponse>>,
}

/// Shopee Affiliate API client.
///
/// Cheap to clone; clones share credentials and the pooled transport.
///
/// The transport is opened by [`connect`](Self::connect) (or lazily by the
/// first query) and released by [`close`](Self::close). Both are idempotent.
/// [`scoped`](Self::scoped) runs a closure between the two and closes on
/// every exit path.
#[derive(Clone)]
pub struct ShopeeClient {
    inner: Arc<ShopeeClientInner>,
}

struct ShopeeClientInner {
    credentials: Credentials,
    endpoint: String,
    timeout: Duration,
    transport: RwLock<Option<reqwest::Client>>,
}

impl std::fmt::Debug for ShopeeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopeeClient")
            .field("credentials", &self.inner.credentials)
            .field("endpoint", &self.inner.endpoint)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl ShopeeClient {
    /// Create a client. No connection is opened until first use.
    #[must_use]
    pub fn new(config: &ShopeeConfig) -> Self {
        Self {
            inner: Arc::new(ShopeeClientInner {
                credentials: config.credentials(),
                endpoint: config.endpoint.clone(),
                timeout: config.timeout,
                transport: RwLock::new(None),
            }),
        }
    }

    /// The configured GraphQL endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the HTTP transport. No-op when already open.
    ///
    /// # Errors
    ///
    /// Returns `ShopeeError::Transport` if the HTTP client cannot be built.
    pub async fn connect(&self) -> Result<(), ShopeeError> {
        self.open().await.map(|_| ())
    }

    /// Release the HTTP transport. No-op when already closed.
    pub async fn close(&self) {
        if self.inner.transport.write().await.take().is_some() {
            tracing::debug!("Shopee transport closed");
        } else {
            tracing::debug!("Shopee transport already closed");
        }
    }

    /// Whether the transport is currently open.
    pub async fn is_connected(&self) -> bool {
        self.inner.transport.read().await.is_some()
    }

    /// Run `f` with a connected client, closing the transport afterwards
    /// whether `f` succeeded or not.
    ///
    /// # Errors
    ///
    /// Returns the error from [`connect`](Self::connect) or from `f`.
    pub async fn scoped<F, Fut, T>(&self, f: F) -> Result<T, ShopeeError>
    where
        F: FnOnce(Self) -> Fut,
        Fut: Future<Output = Result<T, ShopeeError>>,
    {
        self.connect().await?;
        let result = f(self.clone()).await;
        self.close().await;
        result
    }

    async fn transport(&self) -> Result<reqwest::Client, ShopeeError> {
        if let Some(client) = self.inner.transport.read().await.as_ref() {
            return Ok(client.clone());
        }
        self.open().await
    }

    async fn open(&self) -> Result<reqwest::Client, ShopeeError> {
        let mut transport = self.inner.transport.write().await;
        if let Some(client) = transport.as_ref() {
            return Ok(client.clone());
        }
        let client = reqwest::Client::builder()
            .timeout(self.inner.timeout)
            .build()?;
        *transport = Some(client.clone());
        tracing::debug!(
            app_id = %self.inner.credentials.app_id_hint(),
            "Shopee transport opened"
        );
        Ok(client)
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Sign and send one GraphQL request, then classify the response.
    #[instrument(
        skip(self, query, variables),
        fields(app_id = %self.inner.credentials.app_id_hint())
    )]
    async fn execute(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: Option<&str>,
    ) -> Result<Value, ShopeeError> {
        let body = serde_json::to_string(&GraphQLRequest {
            query,
            variables,
            operation_name,
        })?;
        let request = SignedRequest::now(&self.inner.credentials, body);
        let authorization = request.authorization();

        let transport = self.transport().await?;

        tracing::debug!(timestamp = request.timestamp(), "Sending Shopee GraphQL request");

        let response = transport
            .post(&self.inner.endpoint)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(request.into_body())
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(
                body = %response_text.chars().take(200).collect::<String>(),
                "Shopee rejected request signature"
            );
            return Err(ShopeeError::Auth(response_text));
        }

        if status != reqwest::StatusCode::OK {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Shopee API returned non-success status"
            );
            return Err(ShopeeError::Http {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let response: GraphQLResponse = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse Shopee GraphQL response"
                );
                return Err(ShopeeError::Parse(e));
            }
        };

        // Any `errors` array fails the call, even an empty one
        if let Some(errors) = response.errors {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopeeError::GraphQL(
                errors.into_iter().map(GraphQLError::from).collect(),
            ));
        }

        Ok(response.data.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl GraphQLExecutor for ShopeeClient {
    async fn query_named(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: Option<&str>,
    ) -> Result<Value, ShopeeError> {
        self.execute(query, variables, operation_name).await
    }
}
