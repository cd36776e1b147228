// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Time sources and deterministic timer scheduling.
//!
//! State machines in this workspace never read a wall clock themselves.
//! Callers pass `now_ms` into every transition, and delayed work is kept in
//! a [`Timers`] schedule that the owning driver polls:
//!
//! ```text
//! driver ──now_ms──► machine ──arm/disarm──► Timers
//!   ▲                                          │
//!   └──────────── sleep until next_due ◄───────┘
//! ```
//!
//! Swapping the [`Clock`] for a [`ManualClock`] makes every timer fire at a
//! simulated instant chosen by the test.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for getting the current time in milliseconds.
///
/// This allows injecting a mock clock for testing.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Manually driven clock for simulated-time tests.
///
/// Clones share the same underlying time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock starting at `start_ms`.
    pub fn new(start_ms: u64) -> Self {
        ManualClock {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Sets the current time.
    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    /// Moves time forward and returns the new time.
    pub fn advance(&self, by_ms: u64) -> u64 {
        self.now.fetch_add(by_ms, Ordering::SeqCst).saturating_add(by_ms)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    due_ms: u64,
    period_ms: Option<u64>,
    seq: u64,
}

/// A set of named timers keyed by `K`.
///
/// Each key is armed at most once; arming an armed key replaces it.
/// Due timers are returned earliest first, ties in the order they were armed.
#[derive(Debug, Clone)]
pub struct Timers<K> {
    entries: Vec<Entry<K>>,
    next_seq: u64,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Timers {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<K: Copy + Eq> Timers<K> {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot timer firing at `due_ms`.
    pub fn arm(&mut self, key: K, due_ms: u64) {
        self.insert(key, due_ms, None);
    }

    /// Arms a timer firing at `first_due_ms` and every `period_ms` after.
    pub fn arm_periodic(&mut self, key: K, first_due_ms: u64, period_ms: u64) {
        self.insert(key, first_due_ms, Some(period_ms.max(1)));
    }

    /// Disarms a timer. Returns whether it was armed.
    pub fn disarm(&mut self, key: K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.key != key);
        self.entries.len() != before
    }

    /// Disarms every timer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns whether `key` is armed.
    pub fn is_armed(&self, key: K) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Returns when `key` fires next, if armed.
    pub fn due_at(&self, key: K) -> Option<u64> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.due_ms)
    }

    /// Returns the earliest deadline across all armed timers.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    /// Returns `true` if nothing is armed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    ///
    /// Periodic timers are re-armed one period after their due time.
    /// Call repeatedly until `None` to drain everything that is due; the
    /// caller may arm or disarm timers between calls.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<K> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.seq))
            .map(|(i, _)| i)?;

        let entry = self.entries.remove(idx);
        if let Some(period) = entry.period_ms {
            self.insert(entry.key, entry.due_ms.saturating_add(period), Some(period));
        }
        Some(entry.key)
    }

    fn insert(&mut self, key: K, due_ms: u64, period_ms: Option<u64>) {
        self.entries.retain(|e| e.key != key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            key,
            due_ms,
            period_ms,
            seq,
        });
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
