// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tether - a resilient client for an authenticated chat service.
//!
//! This crate provides the transport layer behind the `tether` CLI: a
//! self-healing chat channel and a login request controller with timeouts,
//! retries and cooldown.
//!
//! # Main Components
//!
//! - [`channel`] - Connection manager with reconnect backoff, and the chat session queue
//! - [`request`] - Request lifecycle controller, diagnostics, and the HTTP auth API
//! - [`Config`] - Service address and timing policy, loaded from TOML
//! - [`Error`] - Error types for all operations
//!
//! # Chatting
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tether::channel::{
//!     ChannelConfig, ChatSession, ConnectionManager, ConnectionState, WebSocketTransport,
//! };
//!
//! let handle = ConnectionManager::spawn(
//!     Arc::new(WebSocketTransport::new()),
//!     "https://chat.example.com",
//!     &token,
//!     ChannelConfig::default(),
//! )?;
//! let mut replies = handle.subscribe();
//! let mut session = ChatSession::new(handle.clone());
//! handle.open()?;
//! handle.wait_for(|s| s.state == ConnectionState::Connected).await?;
//! session.submit("hi")?;
//! session.receive(replies.recv().await?);
//! ```

pub mod channel;
mod cli;
pub mod clock;
mod colors;
mod commands;
pub mod config;
pub mod env;
pub mod error;
mod help;
pub mod request;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{Error, Result};

use std::time::Duration;

/// Time given to blocking work, such as a pending stdin read, at exit.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(commands::dispatch(cli.command, &config));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}
