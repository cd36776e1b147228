// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_vars_constants() {
    assert_eq!(vars::TETHER_CONFIG, "TETHER_CONFIG");
    assert_eq!(vars::TETHER_SERVICE_URL, "TETHER_SERVICE_URL");
    assert_eq!(vars::TETHER_TOKEN, "TETHER_TOKEN");
    assert_eq!(vars::TETHER_PASSWORD, "TETHER_PASSWORD");
    assert_eq!(vars::TETHER_LOG, "TETHER_LOG");
}

#[test]
fn test_token_unset_and_blank() {
    std::env::remove_var("TETHER_TOKEN");
    assert!(token().is_none());

    std::env::set_var("TETHER_TOKEN", "   ");
    assert!(token().is_none());

    std::env::set_var("TETHER_TOKEN", "jwt");
    assert_eq!(token().as_deref(), Some("jwt"));
    std::env::remove_var("TETHER_TOKEN");
}

#[test]
fn test_config_path_set() {
    std::env::set_var("TETHER_CONFIG", "/tmp/tether.toml");
    assert_eq!(config_path(), Some(PathBuf::from("/tmp/tether.toml")));
    std::env::remove_var("TETHER_CONFIG");
}

#[test]
fn test_log_filter_set() {
    std::env::set_var("TETHER_LOG", "tether=debug");
    assert_eq!(log_filter().as_deref(), Some("tether=debug"));
    std::env::remove_var("TETHER_LOG");
}
