//! System clock adapter.
//!
//! Implements [`Clock`]: wall-clock UTC for failure-log timestamps and a
//! monotonic [`Instant`] for the time that passes between control cycles.

use core::time::Duration;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::app::ports::Clock;

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn uptime(&self) -> Duration {
        self.start.elapsed()
    }
}
