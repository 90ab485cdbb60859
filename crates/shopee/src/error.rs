//! Errors that can occur when interacting with the Shopee Affiliate API.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when interacting with the Shopee Affiliate API.
///
/// [`ShopeeError::Auth`] is the only variant that means "fix credentials or
/// clock skew before retrying". Everything else is an API error carrying
/// enough detail (status, GraphQL error list or transport error) for the
/// caller to decide whether to retry.
#[derive(Debug, Error)]
pub enum ShopeeError {
    /// Signature rejected or credentials invalid (HTTP 401).
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Non-200, non-401 HTTP response.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request reached the API but the operation failed application-side.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// Connection refused, timeout, DNS failure or similar.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON of the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A query argument failed validation before any request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ShopeeError {
    /// Whether this is an authentication failure.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Whether this is an API failure (anything other than authentication).
    #[must_use]
    pub const fn is_api(&self) -> bool {
        !self.is_auth()
    }

    /// HTTP status code, when the failure carried one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth(_) => Some(401),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A GraphQL error returned by the Shopee API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Value of `extensions.code` (Shopee uses numeric codes such as `10020`).
    pub code: Option<String>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Raw error entry as it appears in the response `errors` array.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    extensions: Option<GraphQLErrorExtensions>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorExtensions {
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl From<GraphQLErrorResponse> for GraphQLError {
    fn from(raw: GraphQLErrorResponse) -> Self {
        let code = raw
            .extensions
            .and_then(|ext| ext.code)
            .and_then(|code| match code {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            });

        Self {
            message: raw.message,
            code,
            path: raw.path,
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "empty errors array".to_string();
    }
    errors
        .iter()
        .map(|e| match &e.code {
            Some(code) => format!("{} (code {code})", e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = ShopeeError::Auth("Invalid Signature".to_string());
        assert_eq!(err.to_string(), "Authentication failed: Invalid Signature");
        assert!(err.is_auth());
        assert!(!err.is_api());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_http_error_display() {
        let err = ShopeeError::Http {
            status: 500,
            body: "internal error".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: internal error");
        assert!(err.is_api());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field not found".to_string(),
                code: None,
                path: vec![],
            },
            GraphQLError {
                message: "Invalid scrollId".to_string(),
                code: Some("11001".to_string()),
                path: vec![],
            },
        ];
        let err = ShopeeError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid scrollId (code 11001)"
        );
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_empty_graphql_errors_display() {
        let err = ShopeeError::GraphQL(vec![]);
        assert_eq!(err.to_string(), "GraphQL errors: empty errors array");
    }

    #[test]
    fn test_numeric_extension_code() {
        let raw: GraphQLErrorResponse = serde_json::from_str(
            r#"{"message":"rate limited","extensions":{"code":10030,"message":"too many"}}"#,
        )
        .unwrap();
        let err = GraphQLError::from(raw);
        assert_eq!(err.code.as_deref(), Some("10030"));
        assert_eq!(err.message, "rate limited");
    }

    #[test]
    fn test_missing_extensions() {
        let raw: GraphQLErrorResponse =
            serde_json::from_str(r#"{"message":"boom","path":["productOfferV2"]}"#).unwrap();
        let err = GraphQLError::from(raw);
        assert!(err.code.is_none());
        assert_eq!(err.path, vec![serde_json::json!("productOfferV2")]);
    }
}
