//! Per-client rate limiting
//!
//! Fixed-window counters keyed by client identifier. State belongs to one
//! limiter instance; each process (or warm function instance) enforces its
//! own quota.

use crate::config::settings::RateLimitConfig;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Table size above which expired windows are swept, at most once per window
const PRUNE_THRESHOLD: usize = 10_000;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request is admitted
    pub allowed: bool,
    /// Requests allowed per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Time until the current window resets
    pub reset_after: Duration,
}

/// Admission control keyed by client identifier
pub trait RateLimiter: Send + Sync + Debug {
    /// Count one request and report whether it is admitted
    fn check(&self, client_id: &str) -> RateDecision;

    /// Window length
    fn window(&self) -> Duration;

    /// Count one request; `true` when admitted
    fn admit(&self, client_id: &str) -> bool {
        self.check(client_id).allowed
    }
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

#[derive(Debug)]
struct RateTable {
    windows: HashMap<String, RateWindow>,
    last_sweep: Instant,
}

impl RateTable {
    /// Drop expired windows once the table is large and a full window has
    /// passed since the previous sweep
    fn sweep(&mut self, now: Instant, window: Duration) {
        if self.windows.len() < PRUNE_THRESHOLD
            || now.saturating_duration_since(self.last_sweep) < window
        {
            return;
        }

        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.window_start) < window);
        self.last_sweep = now;
        debug!("Pruned {} expired rate-limit windows", before - self.windows.len());
    }
}

/// In-memory fixed-window limiter
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    max_requests: u32,
    window: Duration,
    table: Mutex<RateTable>,
}

impl FixedWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            table: Mutex::new(RateTable {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Check against an explicit clock reading
    ///
    /// The lookup, reset and increment happen under one lock, so concurrent
    /// requests from the same client are never undercounted.
    pub fn check_at(&self, client_id: &str, now: Instant) -> RateDecision {
        let mut table = self
            .table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        table.sweep(now, self.window);

        let entry = table
            .windows
            .entry(client_id.to_string())
            .or_insert(RateWindow { count: 0, window_start: now });

        if now.saturating_duration_since(entry.window_start) >= self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        let allowed = entry.count < self.max_requests;
        if allowed {
            entry.count += 1;
        }

        let elapsed = now.saturating_duration_since(entry.window_start);

        RateDecision {
            allowed,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(entry.count),
            reset_after: self.window.saturating_sub(elapsed),
        }
    }

    /// Number of tracked clients
    pub fn tracked_clients(&self) -> usize {
        self.table
            .lock()
            .map(|t| t.windows.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().windows.len())
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check(&self, client_id: &str) -> RateDecision {
        self.check_at(client_id, Instant::now())
    }

    fn window(&self) -> Duration {
        self.window
    }
}
