//! Request pacing for the news search API.
//!
//! [`RateLimiter`] tracks how many successful news requests this process has
//! made and when the last one went out. Counters live only as long as the
//! process; a restart resets the daily budget even though the upstream quota
//! does not reset.
//!
//! All waiting goes through a [`Clock`] so tests can observe sleeps without
//! actually waiting.

use std::time::Duration;
use tokio::time::Instant;

/// Source of time and delays.
pub trait Clock {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Daily request budget plus minimum spacing between outbound requests.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_requests: u32,
    min_interval: Duration,
    requests_made: u32,
    last_request: Option<Instant>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, min_interval: Duration) -> Self {
        Self {
            max_requests,
            min_interval,
            requests_made: 0,
            last_request: None,
        }
    }

    /// `true` while the daily budget still has room for another request.
    pub fn try_acquire(&self) -> bool {
        self.requests_made < self.max_requests
    }

    /// How long to wait at `now` before the next request may be sent.
    pub fn wait_time(&self, now: Instant) -> Duration {
        match self.last_request {
            Some(last) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Stamp an outbound request, successful or not.
    pub fn mark_sent(&mut self, at: Instant) {
        self.last_request = Some(at);
    }

    /// Count a successful request against the daily budget.
    pub fn record_request(&mut self) {
        self.requests_made = self.requests_made.saturating_add(1);
    }

    pub fn requests_made(&self) -> u32 {
        self.requests_made
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}
