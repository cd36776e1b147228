// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use yare::parameterized;

use super::*;
use crate::error::Error;
use crate::request::api_tests::{MockAuthApi, Scripted};

struct Output {
    out: Vec<u8>,
    err: Vec<u8>,
}

impl Output {
    fn out(&self) -> String {
        String::from_utf8(self.out.clone()).unwrap()
    }

    fn err(&self) -> String {
        String::from_utf8(self.err.clone()).unwrap()
    }
}

async fn login(api: &MockAuthApi, diagnostics: bool) -> (Result<()>, Output) {
    let mut output = Output {
        out: Vec::new(),
        err: Vec::new(),
    };
    let result = run(
        Arc::new(api.clone()),
        &RequestSettings::default(),
        Credentials::new("ada@example.com", "pw"),
        diagnostics,
        &mut output.out,
        &mut output.err,
    )
    .await;
    (result, output)
}

#[tokio::test(start_paused = true)]
async fn prints_token_on_success() {
    let api = MockAuthApi::new([Scripted::token("tok-1", 250)]);
    let (result, output) = login(&api, false).await;

    assert!(result.is_ok());
    assert_eq!(output.out(), "tok-1\n");
    assert!(output.err().contains("Logging in..."));
    assert!(!output.err().contains("Correlation ID"));
}

#[tokio::test(start_paused = true)]
async fn prints_diagnostics_on_request() {
    let api = MockAuthApi::new([Scripted::token("tok-1", 250)]);
    let (_, output) = login(&api, true).await;

    let err = output.err();
    assert!(err.contains("Status: 200"), "{err}");
    assert!(err.contains("Duration: 250ms"), "{err}");
    assert!(err.contains("Correlation ID: corr-ok"), "{err}");
}

#[tokio::test(start_paused = true)]
async fn unauthorized_is_an_error() {
    let api = MockAuthApi::new([Scripted::status(401, 10)]);
    let (result, output) = login(&api, true).await;

    assert!(matches!(
        result,
        Err(Error::Request(RequestError::Unauthorized))
    ));
    assert!(output.out().is_empty());
    assert!(output.err().contains("Status: 401"));
}

#[tokio::test(start_paused = true)]
async fn reports_slow_then_times_out() {
    let api = MockAuthApi::new([Scripted::Hang]);
    let (result, output) = login(&api, true).await;

    assert!(matches!(result, Err(Error::Request(RequestError::Timeout))));
    let err = output.err();
    assert!(err.contains("Taking longer than usual..."), "{err}");
    assert!(err.contains("Status: Timeout"), "{err}");
}

#[tokio::test(start_paused = true)]
async fn reports_retries() {
    let api = MockAuthApi::new([Scripted::status(503, 0), Scripted::token("tok-2", 0)]);
    let (result, output) = login(&api, false).await;

    assert!(result.is_ok());
    assert_eq!(output.out(), "tok-2\n");
    assert!(output.err().contains("Retrying (attempt 1)..."));
}

#[tokio::test(start_paused = true)]
async fn success_without_token_is_malformed() {
    let api = MockAuthApi::new([Scripted::status(200, 0)]);
    let (result, _) = login(&api, false).await;
    assert!(matches!(
        result,
        Err(Error::Request(RequestError::Malformed(_)))
    ));
}

fn snapshot(status: RequestStatus, attempt: u32, cooldown_secs: Option<u32>) -> RequestSnapshot {
    RequestSnapshot {
        status,
        attempt,
        cooldown_secs,
        ..RequestSnapshot::idle()
    }
}

#[parameterized(
    first_attempt = { snapshot(RequestStatus::Submitting, 0, None), Some("Logging in...") },
    retry = { snapshot(RequestStatus::Submitting, 2, None), Some("Retrying (attempt 2)...") },
    slow = { snapshot(RequestStatus::Slow, 0, None), Some("Taking longer than usual...") },
    cooldown = { snapshot(RequestStatus::Failed, 3, Some(42)), Some("Try again in 42s") },
    failed = { snapshot(RequestStatus::Failed, 0, None), None },
    idle = { snapshot(RequestStatus::Idle, 0, None), None },
    succeeded = { snapshot(RequestStatus::Succeeded, 0, None), None },
)]
fn progress_lines(snapshot: RequestSnapshot, expected: Option<&str>) {
    assert_eq!(status_line(&snapshot).as_deref(), expected);
}
