// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors::{self, Stream};
use clap::builder::styling::Styles;

/// Generate clap Styles for help output.
pub fn styles() -> Styles {
    if !colors::should_colorize(Stream::Stdout) {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let header = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(colors::codes::HEADER))));
    let literal = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(colors::codes::LITERAL))));
    let context = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(colors::codes::CONTEXT))));

    Styles::styled()
        .header(header)
        .usage(header)
        .literal(literal)
        .placeholder(context)
        .valid(context)
}

const EXAMPLES: &[(&str, &str)] = &[
    ("tether login --email ada@example.com", "Log in and print an access token"),
    ("tether chat --token \"$TOKEN\"", "Chat over the live channel"),
    ("tether register --email ada@example.com", "Create an account"),
];

/// Examples block shown after the main help.
pub fn examples() -> String {
    let width = EXAMPLES.iter().map(|(cmd, _)| cmd.len()).max().unwrap_or(0);
    let mut out = colors::header("Examples:");
    for (cmd, desc) in EXAMPLES {
        let pad = " ".repeat(width - cmd.len() + 2);
        out.push_str(&format!("\n  {}{pad}{desc}", colors::literal(cmd)));
    }
    out.push_str(&format!(
        "\n\n{}\n  TETHER_CONFIG, TETHER_SERVICE_URL, TETHER_TOKEN, TETHER_PASSWORD, TETHER_LOG",
        colors::header("Environment:")
    ));
    out
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
