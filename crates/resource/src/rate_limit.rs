// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-host sliding-window rate limiter.
//!
//! Over-budget requests fail with `RateLimited` instead of queueing; the
//! caller decides whether to degrade or skip.

use parking_lot::Mutex;
use relay_core::Clock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ResourceError;

/// Window length for the request budget.
pub const WINDOW: Duration = Duration::from_secs(60);
/// Maximum requests per host within one window.
pub const MAX_REQUESTS_PER_WINDOW: usize = 60;

/// Sliding-window limiter keyed by hostname.
#[derive(Clone)]
pub struct RateLimiter<C: Clock> {
    windows: Arc<Mutex<HashMap<String, VecDeque<u64>>>>,
    max_requests: usize,
    window: Duration,
    clock: C,
}

impl<C: Clock> RateLimiter<C> {
    pub fn new(clock: C) -> Self {
        Self::with_budget(MAX_REQUESTS_PER_WINDOW, WINDOW, clock)
    }

    pub fn with_budget(max_requests: usize, window: Duration, clock: C) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
            clock,
        }
    }

    /// Record one request against `host`, failing when the budget is spent.
    pub fn acquire(&self, host: &str) -> Result<(), ResourceError> {
        let now = self.clock.epoch_ms();
        let cutoff = now.saturating_sub(self.window.as_millis() as u64);

        let mut windows = self.windows.lock();
        let stamps = windows.entry(host.to_string()).or_default();
        while stamps.front().is_some_and(|&t| t <= cutoff) {
            stamps.pop_front();
        }
        if stamps.len() >= self.max_requests {
            return Err(ResourceError::RateLimited {
                host: host.to_string(),
            });
        }
        stamps.push_back(now);
        Ok(())
    }
}

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;
