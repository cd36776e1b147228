// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "TETHER_CONFIG",
    "TETHER_SERVICE_URL",
    "TETHER_TOKEN",
    "TETHER_PASSWORD",
    "TETHER_LOG",
];

/// The `tether` binary with a clean environment rooted in `home`.
///
/// No user config is visible, so defaults apply unless a test adds one.
pub fn tether(home: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("tether");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("NO_COLOR", "1");
    cmd
}

/// Write `content` to a config file inside `home` and return its path.
pub fn write_config(home: &TempDir, content: &str) -> std::path::PathBuf {
    let path = home.path().join("tether.toml");
    std::fs::write(&path, content).unwrap();
    path
}
