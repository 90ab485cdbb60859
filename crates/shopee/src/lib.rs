//! Afiliado Shopee - Shopee Affiliate Open API client.
//!
//! This crate wraps the Shopee Affiliate GraphQL endpoint with the pieces a
//! long-running importer needs:
//!
//! - [`signing`] - Per-request SHA-256 signatures and the `Authorization` header
//! - [`client`] - HTTP transport, response classification, [`GraphQLExecutor`]
//! - [`operations`] - Typed searches, short links and conversion reports
//! - [`rate_limit`] - Sliding-window request budget and the [`RateLimited`] wrapper
//! - [`paginator`] - `scrollId` pagination with cursor expiry handling
//! - [`queries`] - Typed GraphQL documents with escaped, validated arguments
//!
//! # Example
//!
//! ```rust,ignore
//! use afiliado_shopee::{AffiliateApi, RateLimited, ShopeeClient, ShopeeConfig};
//! use afiliado_shopee::queries::ProductSearch;
//!
//! let config = ShopeeConfig::from_env()?;
//! let client = RateLimited::from_config(ShopeeClient::new(&config), &config);
//!
//! let page = client
//!     .search_products(&ProductSearch::new().keyword("fone bluetooth"))
//!     .await?;
//! ```
//!
//! # Security
//!
//! The app secret is held in a [`secrecy::SecretString`] and only exposed at
//! the moment a signature is computed. It is never logged.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod error;
pub mod operations;
pub mod paginator;
pub mod queries;
pub mod rate_limit;
pub mod signing;
pub mod types;

pub use client::{GraphQLExecutor, ShopeeClient};
pub use config::{ConfigError, RateLimitConfig, ShopeeConfig};
pub use error::{GraphQLError, ShopeeError};
pub use operations::AffiliateApi;
pub use paginator::{Completion, CursorPaginator, Page, PaginationOutcome, fetch_all_conversions};
pub use queries::{
    ConversionReportRequest, GraphQLOperation, OfferSearch, ProductSearch, ShopSearch,
    ShortLinkRequest,
};
pub use rate_limit::{RateLimitStatus, RateLimited, RateLimiter};
pub use signing::{Credentials, SignedRequest};
pub use types::{
    Conversion, ConversionReport, OfferPage, PageInfo, ProductOffer, ShopOffer, ShopeeOffer,
    ShortLink,
};
