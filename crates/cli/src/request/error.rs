// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request failure taxonomy.
//!
//! `Display` yields the message shown to the user. Technical detail (the
//! status code, the transport error) is kept in the variant for logs and
//! diagnostics.

/// Why a request did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("You're offline. Check your connection.")]
    Offline,

    #[error("Connection timed out. Retry or contact support.")]
    Timeout,

    /// Superseded or explicitly cancelled. Never shown to the user.
    #[error("request cancelled")]
    Aborted,

    #[error("Incorrect email or password.")]
    Unauthorized,

    #[error("Too many attempts. Try again later.")]
    RateLimited,

    #[error("Service temporarily unavailable.")]
    ServerError(u16),

    /// No response was received.
    #[error("Network error. Check your connection.")]
    Network(String),

    /// Any other non-success status.
    #[error("An unexpected error occurred.")]
    Rejected(u16),

    #[error("Too many attempts. Please wait.")]
    CoolingDown { remaining_secs: u32 },

    /// A success response whose body could not be understood.
    #[error("An unexpected error occurred.")]
    Malformed(String),
}

impl RequestError {
    /// Classifies an HTTP status. Returns `None` for 2xx.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            401 => Some(RequestError::Unauthorized),
            429 => Some(RequestError::RateLimited),
            500.. => Some(RequestError::ServerError(status)),
            _ => Some(RequestError::Rejected(status)),
        }
    }

    /// Whether the failure may clear up by itself and is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, RequestError::ServerError(_) | RequestError::Network(_))
    }

    /// Whether the user should be told about this failure.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, RequestError::Aborted)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
