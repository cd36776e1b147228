// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_paint_wraps_text() {
    assert_eq!(paint(74, "Examples:"), "\x1b[38;5;74mExamples:\x1b[0m");
}

#[test]
fn test_color_codes() {
    assert_eq!(codes::HEADER, 74);
    assert_eq!(codes::LITERAL, 250);
    assert_eq!(codes::CONTEXT, 245);
}

#[test]
fn test_helpers_keep_text() {
    // Whatever the terminal, the text itself survives.
    assert!(header("Examples:").contains("Examples:"));
    assert!(literal("tether chat").contains("tether chat"));
    assert!(status("Online").contains("Online"));
    assert!(speaker("assistant").contains("assistant"));
}
