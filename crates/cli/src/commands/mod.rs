//! CLI command implementations.

use std::io::Write;

use afiliado_shopee::RateLimitStatus;
use serde::Serialize;

pub mod connection;
pub mod conversions;
pub mod offers;
pub mod short_link;

/// Write `value` to stdout as pretty JSON followed by a newline.
pub fn write_json<T: Serialize>(value: &T) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

/// Log how much of the request budget this run used.
pub fn log_rate_status(status: &RateLimitStatus) {
    tracing::info!(
        used = status.used,
        remaining = status.remaining,
        total = status.total,
        reset_in_seconds = status.reset_in_seconds,
        percentage_used = format_args!("{:.1}", status.percentage_used),
        "Rate limit status"
    );
}
