// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::help;

/// Rejects empty and whitespace-only values at parse time.
fn non_empty_string(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("value must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

#[derive(Debug, Parser)]
#[command(name = "tether")]
#[command(about = "Resilient client for the chat service")]
#[command(
    long_about = "Resilient client for the chat service.\n\n\
    Logs in with retries and timeouts, and keeps a chat channel alive across dropped connections."
)]
#[command(styles = help::styles())]
#[command(after_help = help::examples())]
#[command(version)]
pub struct Cli {
    /// Path to a config file (default: the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log connection and request activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and print an access token
    Login {
        #[arg(long, value_parser = non_empty_string)]
        email: String,

        /// Password (default: $TETHER_PASSWORD)
        #[arg(long)]
        password: Option<String>,

        /// Print status, duration and correlation id of the last exchange
        #[arg(long)]
        diagnostics: bool,
    },

    /// Create an account
    Register {
        #[arg(long, value_parser = non_empty_string)]
        email: String,

        /// Password (default: $TETHER_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Chat over the live channel, one message per line of input
    Chat {
        /// Access token (default: $TETHER_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
