// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns a non-empty variable value.
fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the value of `TETHER_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    non_empty(vars::TETHER_CONFIG).map(PathBuf::from)
}

/// Returns the value of `TETHER_SERVICE_URL` if set.
pub fn service_url() -> Option<String> {
    non_empty(vars::TETHER_SERVICE_URL)
}

/// Returns the value of `TETHER_TOKEN` if set.
pub fn token() -> Option<String> {
    non_empty(vars::TETHER_TOKEN)
}

/// Returns the value of `TETHER_PASSWORD` if set.
pub fn password() -> Option<String> {
    std::env::var(vars::TETHER_PASSWORD).ok()
}

/// Returns the value of `TETHER_LOG` if set.
pub fn log_filter() -> Option<String> {
    non_empty(vars::TETHER_LOG)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
