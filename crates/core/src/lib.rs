//! Afiliado Core - Shared marketplace types.
//!
//! This crate provides common types used across all Afiliado components:
//! - `shopee` - Signed, rate-limited Shopee Affiliate Open API client
//! - `cli` - Command-line tools for querying the affiliate API
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for marketplace IDs, prices, commission
//!   rates, sort orders and conversion statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
