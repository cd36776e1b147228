// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    invalid_address = { Error::InvalidAddress("'x': relative URL".into()), "relative URL" },
    unsupported_scheme = { Error::UnsupportedScheme("ftp".into()), "ftp" },
    scheme_hint = { Error::UnsupportedScheme("ftp".into()), "hint: the service address" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
