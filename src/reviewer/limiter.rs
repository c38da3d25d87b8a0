//! Sliding-window limiter for remote reviewer calls.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::clock::SharedClock;
use crate::constants::RATE_LIMIT_WINDOW_SECS;

pub const DEFAULT_RATE_LIMIT_PER_MINUTE: usize = 20;

/// Upper bound accepted by config validation.
pub const MAX_RATE_LIMIT_PER_MINUTE: usize = 10_000;

/// Window slots allocated up front; the deque grows past this on demand.
const PREALLOCATED_SLOTS: usize = 64;

/// Admits at most `max_calls` acquisitions within any trailing window.
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
    clock: SharedClock,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_calls", &self.max_calls)
            .field("window", &self.window)
            .field("in_window", &self.calls.lock().len())
            .finish()
    }
}

impl RateLimiter {
    /// Limiter over the standard one-minute window.
    pub fn per_minute(max_calls: usize, clock: SharedClock) -> Self {
        Self::new(max_calls, Duration::from_secs(RATE_LIMIT_WINDOW_SECS), clock)
    }

    pub fn new(max_calls: usize, window: Duration, clock: SharedClock) -> Self {
        Self {
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls.min(PREALLOCATED_SLOTS))),
            clock,
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Records a call and returns `true`, or returns `false` without recording if the window is full.
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut calls = self.calls.lock();
        Self::prune(&mut calls, now, self.window);

        if calls.len() >= self.max_calls {
            return false;
        }
        calls.push_back(now);
        true
    }

    /// Calls recorded inside the current window.
    pub fn in_window(&self) -> usize {
        let now = self.clock.now();
        let mut calls = self.calls.lock();
        Self::prune(&mut calls, now, self.window);
        calls.len()
    }

    pub fn remaining(&self) -> usize {
        self.max_calls.saturating_sub(self.in_window())
    }

    fn prune(calls: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&oldest) = calls.front() {
            if now.saturating_duration_since(oldest) >= window {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}
