// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction for testable time handling
//!
//! Schedule matching is driven by local wall-clock time (weekday plus
//! time-of-day), so the clock hands out a `NaiveDateTime` rather than a
//! monotonic instant.

use chrono::{Duration, Local, NaiveDateTime};
use std::sync::{Arc, Mutex};

/// A clock that provides the current local wall-clock time
pub trait WallClock: Clone + Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// Real system clock (local timezone)
#[derive(Clone, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<NaiveDateTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: Arc::new(Mutex::new(Local::now().naive_local())),
        }
    }

    /// Create a clock frozen at a specific timestamp
    pub fn at(timestamp: NaiveDateTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(timestamp)),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += duration;
    }

    /// Set the clock to a specific timestamp
    pub fn set(&self, timestamp: NaiveDateTime) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = timestamp;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
