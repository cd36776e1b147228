// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn records_duration_status_and_correlation() {
    let mut recorder = DiagnosticsRecorder::new();
    recorder.begin(1_000);
    recorder.finish(1_250, HttpStatus::Code(401), Some("req-7".into()));

    let last = recorder.last().unwrap();
    assert_eq!(last.duration_ms, 250);
    assert_eq!(last.http_status, HttpStatus::Code(401));
    assert_eq!(last.correlation_id.as_deref(), Some("req-7"));
}

#[test]
fn begin_discards_previous_record() {
    let mut recorder = DiagnosticsRecorder::new();
    recorder.begin(0);
    recorder.finish(10, HttpStatus::Code(200), None);

    recorder.begin(20);
    assert!(recorder.last().is_none());

    recorder.finish(50, HttpStatus::NetworkError, None);
    assert_eq!(recorder.last().unwrap().duration_ms, 30);
}

#[test]
fn finish_without_begin_is_ignored() {
    let mut recorder = DiagnosticsRecorder::new();
    recorder.finish(10, HttpStatus::Timeout, None);
    assert!(recorder.last().is_none());

    // A second finish for the same exchange does not overwrite.
    recorder.begin(0);
    recorder.finish(5, HttpStatus::Code(500), None);
    recorder.finish(9, HttpStatus::Code(200), None);
    assert_eq!(recorder.last().unwrap().http_status, HttpStatus::Code(500));
}

#[test]
fn display_block() {
    let with_id = Diagnostics {
        duration_ms: 312,
        http_status: HttpStatus::Code(500),
        correlation_id: Some("abc-123".into()),
    };
    assert_eq!(
        with_id.to_string(),
        "Status: 500\nDuration: 312ms\nCorrelation ID: abc-123"
    );

    let network = Diagnostics {
        duration_ms: 5,
        http_status: HttpStatus::NetworkError,
        correlation_id: None,
    };
    assert_eq!(network.to_string(), "Status: Network Error\nDuration: 5ms");
}
