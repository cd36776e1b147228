// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Timing and correlation metadata for the most recent exchange.

use std::fmt;

/// Outcome of an exchange as seen by diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Code(u16),
    /// No response was received.
    NetworkError,
    /// Cancelled by the hard timeout.
    Timeout,
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpStatus::Code(code) => write!(f, "{code}"),
            HttpStatus::NetworkError => write!(f, "Network Error"),
            HttpStatus::Timeout => write!(f, "Timeout"),
        }
    }
}

/// Diagnostics for one completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub duration_ms: u64,
    pub http_status: HttpStatus,
    pub correlation_id: Option<String>,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.http_status)?;
        write!(f, "Duration: {}ms", self.duration_ms)?;
        if let Some(id) = &self.correlation_id {
            write!(f, "\nCorrelation ID: {id}")?;
        }
        Ok(())
    }
}

/// Keeps the record for the latest completed exchange only.
///
/// [`begin`](Self::begin) discards the previous record, so a present record
/// never belongs to an exchange that is still running.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsRecorder {
    started_at: Option<u64>,
    last: Option<Diagnostics>,
}

impl DiagnosticsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, now_ms: u64) {
        self.started_at = Some(now_ms);
        self.last = None;
    }

    /// Completes the running exchange. Ignored if none was begun.
    pub fn finish(&mut self, now_ms: u64, http_status: HttpStatus, correlation_id: Option<String>) {
        let Some(started_at) = self.started_at.take() else {
            return;
        };
        self.last = Some(Diagnostics {
            duration_ms: now_ms.saturating_sub(started_at),
            http_status,
            correlation_id,
        });
    }

    pub fn last(&self) -> Option<&Diagnostics> {
        self.last.as_ref()
    }
}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod tests;
