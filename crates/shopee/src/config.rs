//! Shopee client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPEE_APP_ID` - App ID from the Shopee affiliate portal
//! - `SHOPEE_APP_SECRET` - App secret from the Shopee affiliate portal
//!
//! ## Optional
//! - `SHOPEE_API_ENDPOINT` - GraphQL endpoint (default: Shopee BR open API)
//! - `SHOPEE_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `SHOPEE_RATE_LIMIT_MAX` - Requests allowed per window (default: 2000)
//! - `SHOPEE_RATE_LIMIT_WINDOW_SECS` - Rate limit window in seconds (default: 3600)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::signing::Credentials;

/// Shopee Brazil affiliate GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://open-api.affiliate.shopee.com.br/graphql";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Requests per window allowed by the Shopee affiliate API.
pub const DEFAULT_RATE_LIMIT_MAX: usize = 2000;

/// Length of the Shopee rate limit window.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(3600);

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Sliding-window rate limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests within one window.
    pub max_requests: usize,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX,
            window: DEFAULT_RATE_LIMIT_WINDOW,
        }
    }
}

/// Shopee Affiliate API configuration.
///
/// Implements `Debug` manually to redact the app secret.
#[derive(Clone)]
pub struct ShopeeConfig {
    /// App ID
    pub app_id: String,
    /// App secret (never logged)
    pub app_secret: SecretString,
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Client-side request budget
    pub rate_limit: RateLimitConfig,
}

impl std::fmt::Debug for ShopeeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopeeConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl ShopeeConfig {
    /// Create a configuration with default endpoint, timeout and rate limit.
    #[must_use]
    pub fn new(app_id: impl Into<String>, app_secret: SecretString) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Override the GraphQL endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the rate limit.
    #[must_use]
    pub const fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Signing credentials for this configuration.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.app_id.clone(), self.app_secret.clone())
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let app_id = get_required_env("SHOPEE_APP_ID")?;
        let app_secret = get_validated_secret("SHOPEE_APP_SECRET")?;

        let endpoint = get_env_or_default("SHOPEE_API_ENDPOINT", DEFAULT_ENDPOINT);
        validate_endpoint(&endpoint, "SHOPEE_API_ENDPOINT")?;

        let timeout = Duration::from_secs(ensure_nonzero(
            "SHOPEE_TIMEOUT_SECS",
            parse_env_or_default("SHOPEE_TIMEOUT_SECS", 30)?,
        )?);

        let max_requests = ensure_nonzero(
            "SHOPEE_RATE_LIMIT_MAX",
            parse_env_or_default("SHOPEE_RATE_LIMIT_MAX", DEFAULT_RATE_LIMIT_MAX)?,
        )?;
        let window = Duration::from_secs(ensure_nonzero(
            "SHOPEE_RATE_LIMIT_WINDOW_SECS",
            parse_env_or_default(
                "SHOPEE_RATE_LIMIT_WINDOW_SECS",
                DEFAULT_RATE_LIMIT_WINDOW.as_secs(),
            )?,
        )?);

        Ok(Self {
            app_id,
            app_secret,
            endpoint,
            timeout,
            rate_limit: RateLimitConfig {
                max_requests,
                window,
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Reject a zero count or duration.
fn ensure_nonzero<T>(key: &str, value: T) -> Result<T, ConfigError>
where
    T: PartialEq + Default,
{
    if value == T::default() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

/// Validate that the endpoint is an absolute http(s) URL.
fn validate_endpoint(endpoint: &str, var_name: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder secrets copied from `.env.example`.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Low entropy is suspicious but not proof of a placeholder
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        tracing::warn!(
            var = var_name,
            entropy,
            "Secret has unusually low entropy"
        );
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
