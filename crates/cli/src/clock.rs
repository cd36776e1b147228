// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Monotonic clock for the runtime actors.
//!
//! [`MonotonicClock`] is built on `tokio::time::Instant`, so tests running
//! with paused time see exactly the durations they advance. Actors accept
//! any [`Clock`] and turn its due times into tokio deadlines with
//! [`deadline`].

use std::time::Duration;

use tether_core::Clock;
use tokio::time::Instant;

/// Milliseconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// The tokio instant at which `clock` reads `due_ms`.
///
/// Due times already passed map to now.
pub fn deadline<C: Clock>(clock: &C, due_ms: u64) -> Instant {
    Instant::now() + Duration::from_millis(due_ms.saturating_sub(clock.now_ms()))
}

/// Sleeps until `deadline`, or forever when there is none.
pub async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
