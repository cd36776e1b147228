// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;
use std::sync::Arc;

use crate::colors;
use crate::config::RequestSettings;
use crate::error::Result;
use crate::request::{
    AuthApi, Credentials, RequestController, RequestError, RequestSnapshot, RequestStatus,
};

/// Log in and print the access token to `out`.
///
/// Progress goes to `err` as the controller moves through its states.
pub async fn run<A: AuthApi>(
    api: Arc<A>,
    settings: &RequestSettings,
    credentials: Credentials,
    show_diagnostics: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let handle = RequestController::spawn(api, settings.policy(), settings.backoff());
    let mut snapshots = handle.watch();
    let mut outcome = handle.submit(credentials);
    let mut last_line = None;

    let result = loop {
        tokio::select! {
            result = &mut outcome => break result.unwrap_or(Err(RequestError::Aborted)),
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Err(RequestError::Aborted);
                }
                let line = status_line(&snapshots.borrow_and_update());
                if line.is_some() && line != last_line {
                    if let Some(text) = &line {
                        writeln!(err, "{}", colors::status(text))?;
                    }
                    last_line = line;
                }
            }
        }
    };

    if show_diagnostics {
        if let Some(diagnostics) = handle.snapshot().diagnostics {
            writeln!(err, "{diagnostics}")?;
        }
    }

    let token = result?.access_token()?;
    writeln!(out, "{token}")?;
    Ok(())
}

/// Progress line for a snapshot, if it warrants one.
pub(crate) fn status_line(snapshot: &RequestSnapshot) -> Option<String> {
    match snapshot.status {
        RequestStatus::Submitting if snapshot.attempt == 0 => Some("Logging in...".to_string()),
        RequestStatus::Submitting => Some(format!("Retrying (attempt {})...", snapshot.attempt)),
        RequestStatus::Slow => Some("Taking longer than usual...".to_string()),
        RequestStatus::Failed => snapshot
            .cooldown_secs
            .map(|secs| format!("Try again in {secs}s")),
        _ => None,
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
