// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::channel::ChannelError;
use crate::request::RequestError;

/// All possible errors that can occur in the tether library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid config file {path}: {message}\n  hint: check the TOML syntax and field names")]
    Config { path: String, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no access token\n  hint: pass --token or set TETHER_TOKEN (run 'tether login' to get one)")]
    MissingToken,

    #[error("no password\n  hint: pass --password or set TETHER_PASSWORD")]
    MissingPassword,

    #[error("{0}")]
    Registration(String),

    #[error(transparent)]
    Core(#[from] tether_core::Error),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for tether operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
