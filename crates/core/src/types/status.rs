//! Status enums for affiliate conversions.

use serde::{Deserialize, Serialize};

/// Conversion (order) status reported by `conversionReport`.
///
/// Statuses the API adds later deserialize as [`ConversionStatus::Unknown`]
/// instead of failing the whole report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
    Unpaid,
    #[serde(other)]
    Unknown,
}

impl ConversionStatus {
    /// Whether the conversion can still earn commission.
    #[must_use]
    pub const fn is_billable(&self) -> bool {
        matches!(self, Self::Pending | Self::Completed)
    }
}

impl std::fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Unpaid => write!(f, "unpaid"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
