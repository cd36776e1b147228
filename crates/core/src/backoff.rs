// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry delay policies.
//!
//! Both policies are pure functions of the attempt count. They hold only
//! their configuration and can be shared freely between components.

use rand::Rng;

/// Maps a zero-based attempt count to a delay in milliseconds.
pub trait Backoff: Send + Sync {
    /// Delay to wait before retry number `attempt + 1`.
    fn delay_ms(&self, attempt: u32) -> u64;
}

/// `base * 2^attempt`, saturating instead of overflowing.
fn exponential(base_ms: u64, attempt: u32) -> u64 {
    2u64.checked_pow(attempt)
        .and_then(|factor| base_ms.checked_mul(factor))
        .unwrap_or(u64::MAX)
}

/// Deterministic capped exponential backoff used for channel reconnects.
///
/// `min(base * 2^attempt, cap)`: 1s, 2s, 4s, 8s, 10s, 10s, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionBackoff {
    pub base_ms: u64,
    pub cap_ms: u64,
}

impl Default for ConnectionBackoff {
    fn default() -> Self {
        ConnectionBackoff {
            base_ms: 1_000,
            cap_ms: 10_000,
        }
    }
}

impl Backoff for ConnectionBackoff {
    fn delay_ms(&self, attempt: u32) -> u64 {
        exponential(self.base_ms, attempt).min(self.cap_ms)
    }
}

/// Exponential backoff with additive jitter used for request retries.
///
/// `base * 2^attempt + uniform(0, jitter)`. The jitter spreads retries from
/// many clients so they do not hit a recovering server at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestBackoff {
    pub base_ms: u64,
    pub jitter_ms: u64,
}

impl Default for RequestBackoff {
    fn default() -> Self {
        RequestBackoff {
            base_ms: 1_000,
            jitter_ms: 1_000,
        }
    }
}

impl RequestBackoff {
    /// The delay for `attempt` with an explicit jitter value.
    ///
    /// `jitter` is clamped below `jitter_ms`.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: u64) -> u64 {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            jitter.min(self.jitter_ms - 1)
        };
        exponential(self.base_ms, attempt).saturating_add(jitter)
    }
}

impl Backoff for RequestBackoff {
    fn delay_ms(&self, attempt: u32) -> u64 {
        let jitter = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..self.jitter_ms)
        };
        self.delay_with_jitter(attempt, jitter)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
