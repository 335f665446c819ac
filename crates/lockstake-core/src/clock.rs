//! Time sources for the ledger
//!
//! The ledger never reads the wall clock directly. Every operation that needs
//! `now` asks its `Clock`, so production code uses [`SystemClock`] while tests
//! and scripted replays drive a [`ManualClock`].

use crate::types::{Timestamp, SECONDS_PER_DAY};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current Unix time in seconds
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `chrono::Utc`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp()
    }
}

/// Manually driven clock
///
/// Clones share the same underlying time, so a test can keep one handle
/// while the engine owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    time: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock starting at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            time: Arc::new(AtomicI64::new(start)),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }

    /// Move forward by `seconds`, returning the new time
    pub fn advance(&self, seconds: i64) -> Timestamp {
        self.time.fetch_add(seconds, Ordering::SeqCst) + seconds
    }

    /// Move forward by whole days
    pub fn advance_days(&self, days: i64) -> Timestamp {
        self.advance(days * SECONDS_PER_DAY)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
