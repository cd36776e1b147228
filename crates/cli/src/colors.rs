// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color utilities for help and status output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers and the assistant's name: steel blue
    pub const HEADER: u8 = 74;
    /// Commands/literals: light grey
    pub const LITERAL: u8 = 250;
    /// Status lines and hints: medium grey
    pub const CONTEXT: u8 = 245;
}

/// Which output stream text is destined for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize(stream: Stream) -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    match stream {
        Stream::Stdout => std::io::stdout().is_terminal(),
        Stream::Stderr => std::io::stderr().is_terminal(),
    }
}

/// Wrap `text` in a 256-color foreground sequence.
pub fn paint(code: u8, text: &str) -> String {
    format!("\x1b[38;5;{code}m{text}\x1b[0m")
}

fn paint_if(stream: Stream, code: u8, text: &str) -> String {
    if should_colorize(stream) {
        paint(code, text)
    } else {
        text.to_string()
    }
}

/// Section headers in help output.
pub fn header(text: &str) -> String {
    paint_if(Stream::Stdout, codes::HEADER, text)
}

/// Commands and options in help output.
pub fn literal(text: &str) -> String {
    paint_if(Stream::Stdout, codes::LITERAL, text)
}

/// Status lines written to stderr.
pub fn status(text: &str) -> String {
    paint_if(Stream::Stderr, codes::CONTEXT, text)
}

/// Speaker label for chat output on stdout.
pub fn speaker(text: &str) -> String {
    paint_if(Stream::Stdout, codes::HEADER, text)
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
