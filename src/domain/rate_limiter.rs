//! Fixed-window request counter keyed by client identity.
//!
//! Each client gets its own window that starts with its first request. Within
//! a window at most `max_requests` requests are admitted; the counter resets
//! once the window has elapsed.
//!
//! State lives in a [`DashMap`], so concurrent requests from different
//! clients only contend on the shard holding their key.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Counter state for a single client.
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    count: u32,
    window_start: Instant,
}

/// Result of admitting (or rejecting) one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitOutcome {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the client's current window resets.
    pub reset_after: Duration,
}

/// Per-client fixed-window rate limiter.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: u32,
    windows: DashMap<String, WindowCounter>,
}

impl FixedWindowLimiter {
    /// Creates a limiter admitting `max_requests` per `window` for each client.
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            windows: DashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts a request from `client` at the current instant.
    pub fn check(&self, client: &str) -> RateLimitOutcome {
        self.check_at(client, Instant::now())
    }

    /// Counts a request from `client` at `now`.
    ///
    /// Rejected requests still count, so a client hammering the endpoint
    /// does not get admitted again before its window resets.
    pub fn check_at(&self, client: &str, now: Instant) -> RateLimitOutcome {
        let mut counter = self
            .windows
            .entry(client.to_string())
            .or_insert(WindowCounter {
                count: 0,
                window_start: now,
            });

        if now.saturating_duration_since(counter.window_start) >= self.window {
            counter.count = 0;
            counter.window_start = now;
        }

        counter.count = counter.count.saturating_add(1);

        let elapsed = now.saturating_duration_since(counter.window_start);

        RateLimitOutcome {
            allowed: counter.count <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(counter.count),
            reset_after: self.window.saturating_sub(elapsed),
        }
    }

    /// Drops counters whose window has fully elapsed.
    ///
    /// Returns the number of removed entries.
    pub fn prune_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, counter| now.saturating_duration_since(counter.window_start) < self.window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}
