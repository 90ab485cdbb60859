//! Conversion report export.

use std::time::Duration;

use afiliado_shopee::{
    Completion, Conversion, ConversionReportRequest, CursorPaginator, GraphQLExecutor,
    fetch_all_conversions,
};
use serde::Serialize;

#[derive(Serialize)]
struct Export<'a> {
    pages_fetched: u32,
    restarts: u32,
    complete: bool,
    conversions: &'a [Conversion],
}

/// Fetch every conversion purchased between `from` and `to` and print them.
///
/// Partial results are printed even when a page fails; the failure is then
/// returned so the process exits non-zero.
pub async fn fetch_all<A: GraphQLExecutor>(
    api: &A,
    from: i64,
    to: i64,
    max_pages: Option<u32>,
    delay_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = ConversionReportRequest::new(from, to);

    let mut paginator =
        CursorPaginator::new().delay_between_pages(Duration::from_millis(delay_ms));
    if let Some(max_pages) = max_pages {
        paginator = paginator.max_pages(max_pages);
    }

    let outcome = fetch_all_conversions(api, &request, &paginator).await;

    tracing::info!(
        conversions = outcome.items.len(),
        pages_fetched = outcome.pages_fetched,
        "Conversion report fetched"
    );

    super::write_json(&Export {
        pages_fetched: outcome.pages_fetched,
        restarts: outcome.restarts,
        complete: outcome.is_complete(),
        conversions: &outcome.items,
    })?;

    match outcome.completion {
        Completion::Aborted(e) => Err(e.into()),
        Completion::Capped => {
            tracing::warn!("Stopped at --max-pages; report may be incomplete");
            Ok(())
        }
        Completion::Stalled => {
            Err("Cursor kept expiring; lower --delay-ms below the 30s cursor lifetime".into())
        }
        Completion::Exhausted => Ok(()),
    }
}
