//! Core types for Afiliado.
//!
//! This module provides type-safe wrappers for marketplace concepts.

pub mod commission;
pub mod id;
pub mod price;
pub mod sort;
pub mod status;

pub use commission::CommissionRate;
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use sort::*;
pub use status::*;
