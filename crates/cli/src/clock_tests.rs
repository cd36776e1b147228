// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[tokio::test(start_paused = true)]
async fn follows_paused_time() {
    let clock = MonotonicClock::new();
    assert_eq!(clock.now_ms(), 0);

    tokio::time::advance(Duration::from_millis(1_500)).await;
    assert_eq!(clock.now_ms(), 1_500);
}

#[tokio::test(start_paused = true)]
async fn sleep_until_wakes_at_clock_time() {
    let clock = MonotonicClock::new();

    sleep_until(Some(deadline(&clock, 7_000))).await;
    assert_eq!(clock.now_ms(), 7_000);
}

#[tokio::test(start_paused = true)]
async fn sleep_without_deadline_never_wakes() {
    let result =
        tokio::time::timeout(Duration::from_secs(3_600), sleep_until(None)).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn deadline_follows_any_clock() {
    let clock = tether_core::ManualClock::new(10_000);
    let start = tokio::time::Instant::now();

    assert_eq!(deadline(&clock, 12_500), start + Duration::from_millis(2_500));
    assert_eq!(deadline(&clock, 4_000), start);
}
