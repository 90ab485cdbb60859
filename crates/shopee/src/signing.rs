//! Request signing for the Shopee Affiliate Open API.
//!
//! Every call carries
//! `Authorization: SHA256 Credential={app_id}, Timestamp={ts}, Signature={sig}`
//! where `sig` is the lowercase hex SHA-256 of `app_id + ts + body + secret`.
//! The server rejects timestamps more than ten minutes away from its own
//! clock, so a signature is computed fresh for every request and never cached.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// App credentials issued by the Shopee affiliate portal.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct Credentials {
    app_id: String,
    secret: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from an app ID and secret.
    #[must_use]
    pub fn new(app_id: impl Into<String>, secret: SecretString) -> Self {
        Self {
            app_id: app_id.into(),
            secret,
        }
    }

    /// The app ID.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// App ID shortened for log output (first 8 characters).
    #[must_use]
    pub fn app_id_hint(&self) -> String {
        let prefix: String = self.app_id.chars().take(8).collect();
        format!("{prefix}...")
    }

    /// Sign `body` at `timestamp` with these credentials.
    #[must_use]
    pub fn sign(&self, timestamp: i64, body: &str) -> String {
        sign(&self.app_id, self.secret.expose_secret(), timestamp, body)
    }
}

/// Compute the request signature.
///
/// `SHA256(app_id || timestamp || body || secret)` as lowercase hex. The
/// field order is part of the wire contract; `body` must be byte-identical
/// to what is transmitted.
#[must_use]
pub fn sign(app_id: &str, secret: &str, timestamp: i64, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(app_id.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(body.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Format the `Authorization` header value.
#[must_use]
pub fn build_auth_header(app_id: &str, timestamp: i64, signature: &str) -> String {
    format!("SHA256 Credential={app_id}, Timestamp={timestamp}, Signature={signature}")
}

/// A request body together with the signature computed over it.
///
/// Built once per outbound call. The body stored here is the exact string
/// that goes on the wire.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    app_id: String,
    timestamp: i64,
    body: String,
    signature: String,
}

impl SignedRequest {
    /// Sign `body` at `timestamp`.
    #[must_use]
    pub fn new(credentials: &Credentials, timestamp: i64, body: String) -> Self {
        let signature = credentials.sign(timestamp, &body);
        Self {
            app_id: credentials.app_id().to_string(),
            timestamp,
            body,
            signature,
        }
    }

    /// Sign `body` at the current unix time.
    #[must_use]
    pub fn now(credentials: &Credentials, body: String) -> Self {
        Self::new(credentials, chrono::Utc::now().timestamp(), body)
    }

    /// Unix timestamp (seconds) the signature was computed for.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The signed body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Hex-encoded signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// `Authorization` header value for this request.
    #[must_use]
    pub fn authorization(&self) -> String {
        build_auth_header(&self.app_id, self.timestamp, &self.signature)
    }

    /// Consume the request, returning the body to transmit.
    #[must_use]
    pub fn into_body(self) -> String {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PING_BODY: &str = r#"{"query":"{ping}"}"#;

    #[test]
    fn test_known_signature() {
        // sha256("A1" + "1000" + {"query":"{ping}"} + "S1")
        assert_eq!(
            sign("A1", "S1", 1000, PING_BODY),
            "8b90a3e0e12a45814022399342cea3f019cad86bb2f0795fe0c65a353d9e342b"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let first = sign("A1", "S1", 1000, PING_BODY);
        let second = sign("A1", "S1", 1000, PING_BODY);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_every_input_changes_signature() {
        let base = sign("A1", "S1", 1000, PING_BODY);
        assert_ne!(base, sign("A2", "S1", 1000, PING_BODY));
        assert_ne!(base, sign("A1", "S2", 1000, PING_BODY));
        assert_ne!(base, sign("A1", "S1", 1001, PING_BODY));
        assert_ne!(base, sign("A1", "S1", 1000, r#"{"query":"{pong}"}"#));
    }

    #[test]
    fn test_body_whitespace_changes_signature() {
        let compact = sign("A1", "S1", 1000, PING_BODY);
        let spaced = sign("A1", "S1", 1000, r#"{"query": "{ping}"}"#);
        assert_ne!(compact, spaced);
    }

    #[test]
    fn test_auth_header_format() {
        assert_eq!(
            build_auth_header("A1", 1000, "abc123"),
            "SHA256 Credential=A1, Timestamp=1000, Signature=abc123"
        );
    }

    #[test]
    fn test_signed_request_matches_free_function() {
        let credentials = Credentials::new("A1", SecretString::from("S1"));
        let request = SignedRequest::new(&credentials, 1000, PING_BODY.to_string());

        assert_eq!(request.signature(), sign("A1", "S1", 1000, PING_BODY));
        assert_eq!(request.body(), PING_BODY);
        assert_eq!(
            request.authorization(),
            format!(
                "SHA256 Credential=A1, Timestamp=1000, Signature={}",
                request.signature()
            )
        );
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = Credentials::new("18123456789", SecretString::from("TOPSECRETVALUE"));
        let debug = format!("{credentials:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("TOPSECRETVALUE"));
    }

    #[test]
    fn test_app_id_hint_truncates() {
        let credentials = Credentials::new("18123456789", SecretString::from("x"));
        assert_eq!(credentials.app_id_hint(), "18123456...");
    }
}
