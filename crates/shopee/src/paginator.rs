//! Cursor (`scrollId`) pagination.
//!
//! A Shopee cursor is only valid for 30 seconds after the server issues it.
//! [`CursorPaginator`] fetches pages strictly in order, sleeping between
//! them, and restarts from the first page when the cursor it holds has
//! expired. Items gathered before a restart are kept.
//!
//! Pagination never fails outright: a fetch error ends the run with
//! [`Completion::Aborted`] and whatever was gathered so far. Restarts are
//! capped (see [`CursorPaginator::max_restarts`]) so a delay longer than the
//! cursor lifetime cannot loop forever.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::client::GraphQLExecutor;
use crate::error::ShopeeError;
use crate::operations::AffiliateApi;
use crate::queries::ConversionReportRequest;
use crate::types::{Conversion, ConversionReport};

/// Default pause between page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// How long a `scrollId` stays valid after issuance.
pub const DEFAULT_CURSOR_TTL: Duration = Duration::from_secs(30);

/// Restarts allowed before pagination gives up on an expiring cursor.
pub const DEFAULT_MAX_RESTARTS: u32 = 3;

/// One page of results and the cursor for the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the following page; `None` on the last page.
    pub next_cursor: Option<String>,
    /// When the server issued `next_cursor`. Defaults to when the page was
    /// received.
    pub cursor_issued_at: Option<Instant>,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            next_cursor,
            cursor_issued_at: None,
        }
    }

    /// Record when the cursor was issued.
    #[must_use]
    pub const fn issued_at(mut self, at: Instant) -> Self {
        self.cursor_issued_at = Some(at);
        self
    }
}

impl From<ConversionReport> for Page<Conversion> {
    fn from(report: ConversionReport) -> Self {
        Self::new(report.nodes, report.scroll_id)
    }
}

/// Why pagination stopped.
#[derive(Debug)]
pub enum Completion {
    /// The last page had no cursor or no items.
    Exhausted,
    /// `max_pages` pages were fetched.
    Capped,
    /// A page fetch failed; items gathered before it are kept.
    Aborted(ShopeeError),
    /// The cursor expired again after `max_restarts` restarts.
    Stalled,
}

/// Everything gathered by one pagination run.
#[derive(Debug)]
pub struct PaginationOutcome<T> {
    /// Items from every page, in fetch order.
    pub items: Vec<T>,
    /// Pages successfully fetched, across restarts.
    pub pages_fetched: u32,
    /// Times pagination restarted because the cursor had expired.
    pub restarts: u32,
    pub completion: Completion,
}

impl<T> PaginationOutcome<T> {
    /// Whether every page was read (not capped, stalled or aborted).
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.completion, Completion::Exhausted)
    }

    /// The error that aborted pagination, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ShopeeError> {
        match &self.completion {
            Completion::Aborted(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Sequential cursor paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPaginator {
    max_pages: Option<u32>,
    max_restarts: u32,
    delay_between_pages: Duration,
    cursor_ttl: Duration,
}

impl Default for CursorPaginator {
    fn default() -> Self {
        Self {
            max_pages: None,
            max_restarts: DEFAULT_MAX_RESTARTS,
            delay_between_pages: DEFAULT_PAGE_DELAY,
            cursor_ttl: DEFAULT_CURSOR_TTL,
        }
    }
}

impl CursorPaginator {
    /// Unbounded paginator with a 1s page delay and 30s cursor TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after `max_pages` pages, counting pages fetched before a restart.
    /// Zero means no cap.
    #[must_use]
    pub const fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = if max_pages == 0 { None } else { Some(max_pages) };
        self
    }

    /// Give up with [`Completion::Stalled`] when the cursor expires after
    /// this many restarts.
    #[must_use]
    pub const fn max_restarts(mut self, max_restarts: u32) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    #[must_use]
    pub const fn delay_between_pages(mut self, delay: Duration) -> Self {
        self.delay_between_pages = delay;
        self
    }

    #[must_use]
    pub const fn cursor_ttl(mut self, ttl: Duration) -> Self {
        self.cursor_ttl = ttl;
        self
    }

    /// Fetch pages with `fetch_page` until exhausted, capped or failed.
    ///
    /// `fetch_page` receives `None` for the first page (and after a restart)
    /// and the previous page's cursor otherwise.
    pub async fn fetch_all_pages<T, F, Fut>(&self, mut fetch_page: F) -> PaginationOutcome<T>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<Page<T>, ShopeeError>>,
    {
        let mut items = Vec::new();
        let mut pages_fetched = 0_u32;
        let mut restarts = 0_u32;
        let mut cursor: Option<(String, Instant)> = None;

        if self.delay_between_pages >= self.cursor_ttl {
            tracing::warn!(
                delay_secs = self.delay_between_pages.as_secs(),
                ttl_secs = self.cursor_ttl.as_secs(),
                "Page delay is not shorter than the cursor lifetime, every cursor will expire"
            );
        }

        let completion = loop {
            let request_cursor = match cursor.take() {
                Some((_, issued_at)) if issued_at.elapsed() > self.cursor_ttl => {
                    if restarts >= self.max_restarts {
                        tracing::warn!(
                            restarts,
                            pages_fetched,
                            "Cursor keeps expiring, giving up"
                        );
                        break Completion::Stalled;
                    }
                    tracing::warn!(
                        age_secs = issued_at.elapsed().as_secs(),
                        ttl_secs = self.cursor_ttl.as_secs(),
                        pages_fetched,
                        "Cursor expired, restarting pagination"
                    );
                    restarts += 1;
                    None
                }
                Some((value, _)) => Some(value),
                None => None,
            };

            let page = match fetch_page(request_cursor).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        pages_fetched,
                        items = items.len(),
                        "Page fetch failed, stopping with partial results"
                    );
                    break Completion::Aborted(e);
                }
            };
            pages_fetched += 1;

            let received = page.items.len();
            items.extend(page.items);
            tracing::debug!(
                page = pages_fetched,
                received,
                total = items.len(),
                "Page fetched"
            );

            let next_cursor = page.next_cursor.filter(|c| !c.is_empty());
            let Some(next_cursor) = next_cursor else {
                break Completion::Exhausted;
            };
            if received == 0 {
                break Completion::Exhausted;
            }
            if self.max_pages.is_some_and(|max| pages_fetched >= max) {
                tracing::info!(pages_fetched, "Page limit reached");
                break Completion::Capped;
            }

            cursor = Some((next_cursor, page.cursor_issued_at.unwrap_or_else(Instant::now)));

            if !self.delay_between_pages.is_zero() {
                tokio::time::sleep(self.delay_between_pages).await;
            }
        };

        tracing::info!(
            pages_fetched,
            restarts,
            items = items.len(),
            complete = matches!(completion, Completion::Exhausted),
            "Pagination finished"
        );

        PaginationOutcome {
            items,
            pages_fetched,
            restarts,
            completion,
        }
    }
}

/// Fetch every conversion in `request`'s purchase time range.
///
/// `request`'s own `scroll_id` is ignored; pagination always starts from the
/// first page.
pub async fn fetch_all_conversions<A>(
    api: &A,
    request: &ConversionReportRequest,
    paginator: &CursorPaginator,
) -> PaginationOutcome<Conversion>
where
    A: GraphQLExecutor + ?Sized,
{
    paginator
        .fetch_all_pages(|cursor| {
            let page_request = request.with_scroll_id(cursor);
            async move {
                api.get_conversion_report(&page_request)
                    .await
                    .map(Page::from)
            }
        })
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::ready;

    /// Page with `n` items numbered from `start`, and a cursor when `more`.
    fn page(start: u32, n: u32, more: bool) -> Result<Page<u32>, ShopeeError> {
        let cursor = more.then(|| format!("cursor-{}", start + n));
        Ok(Page::new((start..start + n).collect(), cursor))
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_empty_page() {
        let mut script = VecDeque::from([page(0, 5, true), page(5, 5, true), page(10, 0, true)]);
        let mut calls = Vec::new();

        let outcome = CursorPaginator::new()
            .fetch_all_pages(|cursor| {
                calls.push(cursor);
                ready(script.pop_front().unwrap())
            })
            .await;

        assert_eq!(outcome.items, (0..10).collect::<Vec<_>>());
        assert_eq!(outcome.pages_fetched, 3);
        assert!(outcome.is_complete());
        assert_eq!(
            calls,
            vec![
                None,
                Some("cursor-5".to_string()),
                Some("cursor-10".to_string())
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_without_cursor() {
        let mut script = VecDeque::from([page(0, 3, true), page(3, 2, false)]);
        let outcome = CursorPaginator::new()
            .fetch_all_pages(|_| ready(script.pop_front().unwrap()))
            .await;

        assert_eq!(outcome.items, vec![0, 1, 2, 3, 4]);
        assert_eq!(outcome.pages_fetched, 2);
        assert!(matches!(outcome.completion, Completion::Exhausted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_pages_caps_requests() {
        let mut calls = 0;
        let outcome = CursorPaginator::new()
            .max_pages(1)
            .fetch_all_pages(|_| {
                calls += 1;
                ready(page(0, 10, true))
            })
            .await;

        assert_eq!(calls, 1);
        assert_eq!(outcome.items.len(), 10);
        assert!(matches!(outcome.completion, Completion::Capped));
        assert!(!outcome.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_pages() {
        let start = Instant::now();
        let mut script = VecDeque::from([page(0, 1, true), page(1, 1, true), page(2, 1, false)]);
        CursorPaginator::new()
            .delay_between_pages(Duration::from_secs(2))
            .fetch_all_pages(|_| ready(script.pop_front().unwrap()))
            .await;

        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_cursor_restarts_and_is_bounded() {
        let mut calls = Vec::new();
        let outcome = CursorPaginator::new()
            .max_pages(3)
            .delay_between_pages(Duration::from_secs(31))
            .fetch_all_pages(|cursor| {
                calls.push(cursor);
                ready(page(0, 2, true))
            })
            .await;

        // Every cursor expires during the delay, so each fetch starts over
        assert_eq!(calls, vec![None, None, None]);
        assert_eq!(outcome.pages_fetched, 3);
        assert_eq!(outcome.restarts, 2);
        assert_eq!(outcome.items.len(), 6);
        assert!(matches!(outcome.completion, Completion::Capped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_max_pages_means_unbounded() {
        let mut script = VecDeque::from([page(0, 2, true), page(2, 2, true), page(4, 1, false)]);
        let outcome = CursorPaginator::new()
            .max_pages(0)
            .fetch_all_pages(|_| ready(script.pop_front().unwrap()))
            .await;

        assert_eq!(outcome.pages_fetched, 3);
        assert_eq!(outcome.items, vec![0, 1, 2, 3, 4]);
        assert!(outcome.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiring_cursor_without_page_cap_stalls() {
        let mut calls = 0;
        let outcome = CursorPaginator::new()
            .delay_between_pages(Duration::from_secs(31))
            .fetch_all_pages(|_| {
                calls += 1;
                ready(page(0, 2, true))
            })
            .await;

        assert_eq!(calls, 1 + DEFAULT_MAX_RESTARTS);
        assert_eq!(outcome.restarts, DEFAULT_MAX_RESTARTS);
        assert_eq!(outcome.items.len(), 2 * (1 + DEFAULT_MAX_RESTARTS as usize));
        assert!(matches!(outcome.completion, Completion::Stalled));
        assert!(!outcome.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_max_restarts_stalls_on_first_expiry() {
        let mut calls = 0;
        let outcome = CursorPaginator::new()
            .max_restarts(0)
            .delay_between_pages(Duration::from_secs(31))
            .fetch_all_pages(|_| {
                calls += 1;
                ready(page(0, 1, true))
            })
            .await;

        assert_eq!(calls, 1);
        assert_eq!(outcome.restarts, 0);
        assert!(matches!(outcome.completion, Completion::Stalled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_within_ttl_is_used() {
        let mut calls = Vec::new();
        let mut script = VecDeque::from([page(0, 1, true), page(1, 1, false)]);
        let outcome = CursorPaginator::new()
            .delay_between_pages(Duration::from_secs(29))
            .fetch_all_pages(|cursor| {
                calls.push(cursor);
                ready(script.pop_front().unwrap())
            })
            .await;

        assert_eq!(calls, vec![None, Some("cursor-1".to_string())]);
        assert_eq!(outcome.restarts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_keeps_partial_items() {
        let mut script = VecDeque::from([
            page(0, 4, true),
            Err(ShopeeError::Http {
                status: 503,
                body: "unavailable".to_string(),
            }),
        ]);
        let outcome = CursorPaginator::new()
            .fetch_all_pages(|_| ready(script.pop_front().unwrap()))
            .await;

        assert_eq!(outcome.pages_fetched, 1);
        assert_eq!(outcome.error().and_then(ShopeeError::status), Some(503));
        assert_eq!(outcome.into_items(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_conversion_report_into_page() {
        let report = ConversionReport {
            nodes: vec![Conversion::default()],
            scroll_id: Some("abc".to_string()),
            total_count: 1,
        };
        let page = Page::from(report);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
    }
}
