// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock source for record timestamps and ids.
//!
//! The persistence debounce runs on tokio's timer, which tests pause
//! separately; only the instants stamped into records come from here.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub trait Clock: Send + Sync + fmt::Debug {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Milliseconds since the Unix epoch; zero for instants before it
    fn now_millis(&self) -> u64 {
        u64::try_from(self.now_utc().timestamp_millis()).unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock. Clones observe the same instant.
#[derive(Clone, Debug, Default)]
pub struct FakeClock {
    millis: Arc<AtomicI64>,
}

impl FakeClock {
    pub fn new(start_millis: u64) -> Self {
        let start = i64::try_from(start_millis).unwrap_or(i64::MAX);
        Self {
            millis: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(by, Ordering::SeqCst);
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.millis.store(instant.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Shared clock handed to the producers.
#[derive(Clone, Debug)]
pub struct ClockHandle(Arc<dyn Clock>);

impl ClockHandle {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self(Arc::new(clock))
    }

    pub fn system() -> Self {
        Self::new(SystemClock)
    }

    /// A fresh fake clock frozen at `millis`
    pub fn fake_at(millis: u64) -> Self {
        Self::new(FakeClock::new(millis))
    }
}

impl From<FakeClock> for ClockHandle {
    fn from(clock: FakeClock) -> Self {
        Self::new(clock)
    }
}

impl Clock for ClockHandle {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0.now_utc()
    }
}

impl Default for ClockHandle {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
