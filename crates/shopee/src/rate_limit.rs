//! Client-side sliding-window rate limiting.
//!
//! Shopee allows 2000 requests per rolling hour per app. [`RateLimiter`]
//! keeps the instants of requests issued within the trailing window and makes
//! callers wait once the window is full. [`RateLimited`] wraps any
//! [`GraphQLExecutor`] so every request it sends first acquires a slot.
//!
//! # Overflow policy
//!
//! When the window is full the caller sleeps until the oldest entry ages out
//! (plus a safety margin), then evicts only the entries that have actually
//! expired. The window is never cleared wholesale, so the limit holds for any
//! interval of `window` length, not just aligned ones.
//!
//! Time comes from `tokio::time`, so tests can pause and advance the clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

use crate::client::GraphQLExecutor;
use crate::config::{RateLimitConfig, ShopeeConfig};
use crate::error::ShopeeError;

/// Extra wait added on overflow so the oldest entry is past the window edge.
pub const DEFAULT_MARGIN: Duration = Duration::from_secs(1);

/// Point-in-time view of a limiter's window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateLimitStatus {
    /// Requests issued within the current window.
    pub used: usize,
    /// Requests still available in the current window.
    pub remaining: usize,
    /// Window capacity.
    pub total: usize,
    /// Seconds until the oldest request leaves the window (0 when empty).
    pub reset_in_seconds: u64,
    /// `used / total` as a percentage.
    pub percentage_used: f64,
}

/// Sliding-window rate limiter.
///
/// Share one limiter (behind an `Arc`) between every client that spends the
/// same app budget. Waiters are served in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    margin: Duration,
    /// Serializes `acquire` so waiters queue FIFO; held across the wait.
    gate: tokio::sync::Mutex<()>,
    /// Issued instants, oldest first. Never held across an await.
    issued: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Allow `max_requests` per `window`. A zero `max_requests` is treated as
    /// one.
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            max_requests,
            window,
            margin: DEFAULT_MARGIN,
            gate: tokio::sync::Mutex::new(()),
            issued: Mutex::new(VecDeque::with_capacity(max_requests.min(4096))),
        }
    }

    /// Shopee's published budget: 2000 requests per hour.
    #[must_use]
    pub fn shopee_default() -> Self {
        Self::from_config(RateLimitConfig::default())
    }

    #[must_use]
    pub fn from_config(config: RateLimitConfig) -> Self {
        Self::new(config.max_requests, config.window)
    }

    /// Override the margin added to overflow waits.
    #[must_use]
    pub const fn with_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub const fn max_requests(&self) -> usize {
        self.max_requests
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Wait until a request may be issued, then record it.
    ///
    /// Dropping the returned future before it completes records nothing.
    pub async fn acquire(&self) {
        let _gate = self.gate.lock().await;

        loop {
            let wait = {
                let mut issued = self.issued();
                let now = Instant::now();
                self.evict(&mut issued, now);

                if issued.len() < self.max_requests {
                    issued.push_back(now);
                    return;
                }

                issued
                    .front()
                    .map_or(Duration::ZERO, |oldest| {
                        self.window.saturating_sub(now.duration_since(*oldest))
                    })
            };

            tracing::warn!(
                wait_secs = wait.as_secs(),
                max_requests = self.max_requests,
                window_secs = self.window.as_secs(),
                "Rate limit reached, waiting"
            );
            tokio::time::sleep(wait + self.margin).await;
        }
    }

    /// Current window usage. Does not wait and leaves the window untouched.
    #[must_use]
    pub fn status(&self) -> RateLimitStatus {
        let issued = self.issued();
        let now = Instant::now();
        let expired = issued
            .iter()
            .take_while(|at| now.duration_since(**at) >= self.window)
            .count();

        let used = issued.len().saturating_sub(expired);
        let reset_in = issued.get(expired).map_or(Duration::ZERO, |oldest| {
            self.window.saturating_sub(now.duration_since(*oldest))
        });

        #[allow(clippy::cast_precision_loss)] // Window sizes are far below f64 precision
        let percentage_used = used as f64 / self.max_requests as f64 * 100.0;

        RateLimitStatus {
            used,
            remaining: self.max_requests.saturating_sub(used),
            total: self.max_requests,
            reset_in_seconds: reset_in.as_secs(),
            percentage_used,
        }
    }

    fn issued(&self) -> MutexGuard<'_, VecDeque<Instant>> {
        self.issued.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop entries at least `window` old.
    fn evict(&self, issued: &mut VecDeque<Instant>, now: Instant) {
        while issued
            .front()
            .is_some_and(|oldest| now.duration_since(*oldest) >= self.window)
        {
            issued.pop_front();
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::shopee_default()
    }
}

/// A [`GraphQLExecutor`] whose requests each acquire a rate limiter slot
/// before being forwarded.
#[derive(Debug, Clone)]
pub struct RateLimited<E> {
    inner: E,
    limiter: Arc<RateLimiter>,
}

impl<E> RateLimited<E> {
    /// Wrap `inner`, spending from `limiter`.
    #[must_use]
    pub const fn new(inner: E, limiter: Arc<RateLimiter>) -> Self {
        Self { inner, limiter }
    }

    /// Wrap `inner` with a fresh limiter built from `config.rate_limit`.
    #[must_use]
    pub fn from_config(inner: E, config: &ShopeeConfig) -> Self {
        tracing::info!(
            max_requests = config.rate_limit.max_requests,
            window_secs = config.rate_limit.window.as_secs(),
            "Rate limiting enabled"
        );
        Self::new(inner, Arc::new(RateLimiter::from_config(config.rate_limit)))
    }

    #[must_use]
    pub const fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    #[must_use]
    pub fn status(&self) -> RateLimitStatus {
        self.limiter.status()
    }

    #[must_use]
    pub const fn inner(&self) -> &E {
        &self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> E {
        self.inner
    }
}

#[async_trait]
impl<E: GraphQLExecutor> GraphQLExecutor for RateLimited<E> {
    async fn query_named(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: Option<&str>,
    ) -> Result<Value, ShopeeError> {
        self.limiter.acquire().await;
        self.inner
            .query_named(query, variables, operation_name)
            .await
    }
}
