// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    first = { 0, 1_000 },
    second = { 1, 2_000 },
    third = { 2, 4_000 },
    fourth = { 3, 8_000 },
    capped = { 4, 10_000 },
    still_capped = { 9, 10_000 },
)]
fn connection_backoff_doubles_up_to_cap(attempt: u32, expected: u64) {
    assert_eq!(ConnectionBackoff::default().delay_ms(attempt), expected);
}

#[test]
fn connection_backoff_saturates_for_huge_attempts() {
    let backoff = ConnectionBackoff::default();
    assert_eq!(backoff.delay_ms(64), 10_000);
    assert_eq!(backoff.delay_ms(u32::MAX), 10_000);
}

#[parameterized(
    first = { 0 },
    second = { 1 },
    third = { 2 },
)]
fn request_backoff_stays_within_jitter_window(attempt: u32) {
    let backoff = RequestBackoff::default();
    let floor = 2u64.pow(attempt) * 1_000;
    for _ in 0..200 {
        let delay = backoff.delay_ms(attempt);
        assert!(
            (floor..floor + 1_000).contains(&delay),
            "attempt {attempt}: {delay} outside [{floor}, {})",
            floor + 1_000
        );
    }
}

#[test]
fn request_backoff_with_explicit_jitter() {
    let backoff = RequestBackoff::default();
    assert_eq!(backoff.delay_with_jitter(0, 0), 1_000);
    assert_eq!(backoff.delay_with_jitter(2, 250), 4_250);
    // Jitter never reaches the next whole window.
    assert_eq!(backoff.delay_with_jitter(1, 5_000), 2_999);
}

#[test]
fn request_backoff_without_jitter_is_deterministic() {
    let backoff = RequestBackoff {
        base_ms: 500,
        jitter_ms: 0,
    };
    assert_eq!(backoff.delay_ms(3), 4_000);
    assert_eq!(backoff.delay_with_jitter(3, 999), 4_000);
}
